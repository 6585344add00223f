//! Keyword records and search-volume metadata from input files

use crate::fields::{parse_number, parse_volume, ColumnMapping};
use crate::reader::open_rows;
use crate::{Error, Record, Result};
use kwgroup_core::enrich::insert_volume;
use kwgroup_core::{clamp_score, KeywordRecord, KeywordType, MetadataMap};
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows between read progress callbacks
const READ_PROGRESS_EVERY: usize = 1000;

/// Snapshot of an input file being read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadProgress {
    pub rows: usize,
    pub bytes_processed: u64,
    /// Unknown for compressed input
    pub total_bytes: Option<u64>,
}

/// All rows of an input file plus the union of their field names
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    /// Field names in first-seen order
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl KeywordTable {
    pub fn from_rows(rows: Vec<Record>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in &rows {
            for header in row.headers() {
                if !headers.iter().any(|h| h == header) {
                    headers.push(header.to_string());
                }
            }
        }
        Self { headers, rows }
    }

    /// Read every row of a supported input file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_with(path, |_| {})
    }

    /// Read every row, reporting progress every thousand rows and once at
    /// the end
    pub fn read_with<P, F>(path: P, mut on_progress: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnMut(&ReadProgress),
    {
        let path = path.as_ref();
        let mut reader = open_rows(path)?;
        let mut rows = Vec::new();

        while let Some(row) = reader.next() {
            rows.push(row?);
            if rows.len() % READ_PROGRESS_EVERY == 0 {
                on_progress(&ReadProgress {
                    rows: rows.len(),
                    bytes_processed: reader.bytes_processed(),
                    total_bytes: reader.total_bytes(),
                });
            }
        }
        on_progress(&ReadProgress {
            rows: rows.len(),
            bytes_processed: reader.bytes_processed(),
            total_bytes: reader.total_bytes(),
        });

        if reader.skipped_rows() > 0 {
            warn!("Skipped {} unreadable rows in {:?}", reader.skipped_rows(), path);
        }

        let table = Self::from_rows(rows);
        info!(
            "Read {} rows with {} columns from {:?}",
            table.rows.len(),
            table.headers.len(),
            path
        );
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Detected keyword and volume columns
    pub fn mapping(&self) -> Result<ColumnMapping> {
        ColumnMapping::detect(&self.headers, &self.rows)
            .ok_or_else(|| Error::MissingField("no keyword column found".to_string()))
    }

    /// Non-empty keywords from the keyword column, in row order
    pub fn keywords(&self, mapping: &ColumnMapping) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.text(&mapping.keyword))
            .collect()
    }

    /// Analyzed keyword records
    ///
    /// `type`, `score` and `reasoning` are read from those field names when
    /// present. Scores are clamped to 1–10; rows without a keyword are
    /// skipped.
    pub fn keyword_records(&self, mapping: &ColumnMapping) -> Vec<KeywordRecord> {
        let mut skipped = 0usize;
        let records: Vec<KeywordRecord> = self
            .rows
            .iter()
            .filter_map(|row| {
                let record = row_to_record(row, mapping);
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();
        if skipped > 0 {
            debug!("Skipped {} rows without a keyword", skipped);
        }
        records
    }

    /// Search volumes keyed by lowercased keyword
    ///
    /// The first numeric volume for a keyword wins. Empty when no volume
    /// column was detected.
    pub fn metadata(&self, mapping: &ColumnMapping) -> MetadataMap {
        let mut meta = MetadataMap::new();
        let Some(volume_column) = &mapping.volume else {
            return meta;
        };
        for row in &self.rows {
            let Some(keyword) = row.text(&mapping.keyword) else {
                continue;
            };
            if let Some(volume) = row.get(volume_column).and_then(parse_volume) {
                insert_volume(&mut meta, &keyword, volume);
            }
        }
        meta
    }
}

fn row_to_record(row: &Record, mapping: &ColumnMapping) -> Option<KeywordRecord> {
    let keyword = row.text(&mapping.keyword)?;

    let keyword_type = match row.get("type") {
        None => KeywordType::Generic,
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|_| {
            warn!(
                "Unknown keyword type {} at line {}, using generic",
                value, row.source_line
            );
            KeywordType::Generic
        }),
    };
    let score = row
        .get("score")
        .and_then(parse_number)
        .map(clamp_score)
        .unwrap_or(1.0);

    let mut record = KeywordRecord::new(keyword)
        .with_type(keyword_type)
        .with_score(score)
        .with_reasoning(row.text("reasoning").unwrap_or_default());
    record.search_volume = mapping
        .volume
        .as_ref()
        .and_then(|column| row.get(column))
        .and_then(parse_volume);
    Some(record)
}

/// Load analyzed keyword records from a file
pub fn load_keywords<P: AsRef<Path>>(path: P) -> Result<Vec<KeywordRecord>> {
    load_keywords_with(path, |_| {})
}

/// [`load_keywords`] with read progress
pub fn load_keywords_with<P, F>(path: P, on_progress: F) -> Result<Vec<KeywordRecord>>
where
    P: AsRef<Path>,
    F: FnMut(&ReadProgress),
{
    let table = KeywordTable::read_with(path, on_progress)?;
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let mapping = table.mapping()?;
    Ok(table.keyword_records(&mapping))
}

/// Load a search-volume metadata map from a keyword export
pub fn load_metadata<P: AsRef<Path>>(path: P) -> Result<MetadataMap> {
    load_metadata_with(path, |_| {})
}

/// [`load_metadata`] with read progress
pub fn load_metadata_with<P, F>(path: P, on_progress: F) -> Result<MetadataMap>
where
    P: AsRef<Path>,
    F: FnMut(&ReadProgress),
{
    let table = KeywordTable::read_with(path, on_progress)?;
    if table.is_empty() {
        return Ok(MetadataMap::new());
    }
    let mapping = table.mapping()?;
    if mapping.volume.is_none() {
        warn!("No search volume column detected; metadata is empty");
    }
    Ok(table.metadata(&mapping))
}

/// Load bare keyword strings, e.g. for mock analysis
pub fn load_keyword_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let table = KeywordTable::read(path)?;
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let mapping = table.mapping()?;
    Ok(table.keywords(&mapping))
}
