//! Keyword file formats
//!
//! Reads keyword exports and analysis results (JSON Lines, JSON arrays and
//! plain keyword lists, optionally gzip-compressed), detects which columns
//! hold the keyword and its search volume, and writes grouped or flat
//! results back out.

pub mod error;
pub mod export;
pub mod fields;
pub mod jsonl;
pub mod keywords;
pub mod reader;
pub mod record;

pub use error::{Error, Result};
pub use export::{export_groups, export_records, write_groups_jsonl, write_records_jsonl, write_tsv, OutputWriter};
pub use fields::ColumnMapping;
pub use keywords::{
    load_keyword_list, load_keywords, load_keywords_with, load_metadata, load_metadata_with,
    KeywordTable, ReadProgress,
};
pub use reader::{open_rows, InputFormat, RowReader};
pub use record::Record;
