//! Writers for grouped and flat keyword output
//!
//! Output paths ending in `.gz` are gzip-compressed. Call
//! [`OutputWriter::finish`] so the compressed stream is terminated and
//! buffered data reaches disk.

use crate::jsonl::is_gzip;
use crate::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use kwgroup_core::{KeywordGroup, KeywordRecord};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// TSV header row for spreadsheet export
pub const TSV_HEADER: &str = "Keyword\tSearch Volume\tType\tScore\tAnalysis";

/// Buffered file writer, gzip-compressed when the path ends in `.gz`
pub enum OutputWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        if is_gzip(path) {
            Ok(OutputWriter::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(OutputWriter::Plain(file))
        }
    }

    /// Flush everything and write the gzip trailer if compressed
    pub fn finish(self) -> Result<()> {
        match self {
            OutputWriter::Plain(mut writer) => writer.flush()?,
            OutputWriter::Gzip(encoder) => encoder.finish()?.flush()?,
        }
        Ok(())
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            OutputWriter::Plain(writer) => writer.write(buf),
            OutputWriter::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            OutputWriter::Plain(writer) => writer.flush(),
            OutputWriter::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Flat export layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatFormat {
    Jsonl,
    Tsv,
}

impl FlatFormat {
    /// TSV for `.tsv` / `.tsv.gz`, JSONL otherwise
    pub fn from_path(path: &Path) -> Self {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(name);
        if name.to_ascii_lowercase().ends_with(".tsv") {
            FlatFormat::Tsv
        } else {
            FlatFormat::Jsonl
        }
    }
}

fn write_jsonl<W: Write, T: Serialize>(writer: &mut W, items: &[T]) -> Result<usize> {
    for item in items {
        serde_json::to_writer(&mut *writer, item)?;
        writer.write_all(b"\n")?;
    }
    Ok(items.len())
}

/// One group object per line
pub fn write_groups_jsonl<W: Write>(writer: &mut W, groups: &[KeywordGroup]) -> Result<usize> {
    write_jsonl(writer, groups)
}

/// One keyword record per line
pub fn write_records_jsonl<W: Write>(writer: &mut W, records: &[KeywordRecord]) -> Result<usize> {
    write_jsonl(writer, records)
}

/// Tabs and line breaks would break the row layout
fn tsv_cell(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}

/// Spreadsheet rows with a header; unknown volumes are left blank
pub fn write_tsv<W: Write>(writer: &mut W, records: &[KeywordRecord]) -> Result<usize> {
    writeln!(writer, "{}", TSV_HEADER)?;
    for record in records {
        let volume = record
            .search_volume
            .map(|v| v.to_string())
            .unwrap_or_default();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            tsv_cell(&record.keyword),
            volume,
            record.keyword_type.as_str(),
            record.score,
            tsv_cell(&record.reasoning)
        )?;
    }
    Ok(records.len())
}

/// Write groups as JSONL to `path`
pub fn export_groups<P: AsRef<Path>>(path: P, groups: &[KeywordGroup]) -> Result<usize> {
    let mut writer = OutputWriter::create(path.as_ref())?;
    let written = write_groups_jsonl(&mut writer, groups)?;
    writer.finish()?;
    info!("Wrote {} groups to {:?}", written, path.as_ref());
    Ok(written)
}

/// Write flat records to `path`, as TSV or JSONL depending on the name
pub fn export_records<P: AsRef<Path>>(path: P, records: &[KeywordRecord]) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = OutputWriter::create(path)?;
    let written = match FlatFormat::from_path(path) {
        FlatFormat::Tsv => write_tsv(&mut writer, records)?,
        FlatFormat::Jsonl => write_records_jsonl(&mut writer, records)?,
    };
    writer.finish()?;
    info!("Wrote {} records to {:?}", written, path);
    Ok(written)
}
