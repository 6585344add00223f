//! Unified row reader abstraction
//!
//! Every supported input format is read as a stream of [`Record`] rows,
//! with the format picked from the file extension. A trailing `.gz` is
//! decompressed transparently.

use crate::jsonl::{is_gzip, JsonlReader};
use crate::{Error, Record, Result};
use flate2::read::GzDecoder;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use tracing::info;

/// Trait for row readers providing a unified interface
pub trait RowReader: Iterator<Item = Result<Record>> {
    /// Get total file size in bytes if known
    fn total_bytes(&self) -> Option<u64>;

    /// Get number of bytes processed so far
    fn bytes_processed(&self) -> u64;

    /// Get the number of rows processed
    fn records_processed(&self) -> usize;

    /// Rows dropped because they could not be parsed
    fn skipped_rows(&self) -> usize {
        0
    }
}

/// Input file layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One JSON object per line
    Jsonl,
    /// `.json`: a JSON array of objects, or JSON Lines
    Json,
    /// One keyword per line
    Text,
}

impl InputFormat {
    /// Format from the file name, ignoring a trailing `.gz`
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = if is_gzip(path) {
            path.file_stem().map(Path::new).unwrap_or(path)
        } else {
            path
        };
        let extension = name
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat("No file extension found".to_string()))?;

        match extension.to_ascii_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(InputFormat::Jsonl),
            "json" => Ok(InputFormat::Json),
            "txt" => Ok(InputFormat::Text),
            other => Err(Error::UnsupportedFormat(format!(
                "Unsupported file extension: {}",
                other
            ))),
        }
    }
}

/// Reader over the decompressed contents, plus the byte size when the file
/// is read as-is
fn open_source(path: &Path) -> Result<(Box<dyn Read>, Option<u64>)> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok((Box::new(GzDecoder::new(file)), None))
    } else {
        let size = file.metadata()?.len();
        Ok((Box::new(file), Some(size)))
    }
}

/// JSONL row reader wrapper
pub struct JsonlRowReader {
    reader: JsonlReader<Box<dyn Read>>,
}

impl Iterator for JsonlRowReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}

impl RowReader for JsonlRowReader {
    fn total_bytes(&self) -> Option<u64> {
        self.reader.total_bytes()
    }

    fn bytes_processed(&self) -> u64 {
        self.reader.bytes_processed()
    }

    fn records_processed(&self) -> usize {
        self.reader.lines_processed()
    }

    fn skipped_rows(&self) -> usize {
        self.reader.skipped_lines()
    }
}

/// Rows of an in-memory JSON array
pub struct JsonArrayReader {
    rows: std::vec::IntoIter<Value>,
    index: usize,
    total_bytes: u64,
}

impl JsonArrayReader {
    pub fn new(rows: Vec<Value>, total_bytes: u64) -> Self {
        Self {
            rows: rows.into_iter(),
            index: 0,
            total_bytes,
        }
    }
}

impl Iterator for JsonArrayReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.rows.next()?;
        self.index += 1;
        Some(Ok(Record::new(value, self.index)))
    }
}

impl RowReader for JsonArrayReader {
    fn total_bytes(&self) -> Option<u64> {
        Some(self.total_bytes)
    }

    fn bytes_processed(&self) -> u64 {
        // Parsed up front
        self.total_bytes
    }

    fn records_processed(&self) -> usize {
        self.index
    }
}

/// Plain-text keyword list, one keyword per line
///
/// Each non-blank line becomes a `{"keyword": ...}` row.
pub struct TextLineReader {
    reader: BufReader<Box<dyn Read>>,
    line_number: usize,
    bytes_read: u64,
    total_bytes: Option<u64>,
}

impl TextLineReader {
    pub fn new(reader: Box<dyn Read>, total_bytes: Option<u64>) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            bytes_read: 0,
            total_bytes,
        }
    }
}

impl Iterator for TextLineReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(n) => {
                    self.bytes_read += n as u64;
                    self.line_number += 1;
                    let keyword = line.trim();
                    if keyword.is_empty() {
                        continue;
                    }
                    return Some(Ok(Record::new(json!({ "keyword": keyword }), self.line_number)));
                }
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}

impl RowReader for TextLineReader {
    fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    fn bytes_processed(&self) -> u64 {
        self.bytes_read
    }

    fn records_processed(&self) -> usize {
        self.line_number
    }
}

/// Factory function to open an input file with automatic format detection
///
/// Supported formats:
/// - `.jsonl`, `.ndjson` - JSON Lines
/// - `.json` - JSON array of objects, or JSON Lines
/// - `.txt` - one keyword per line
/// - any of the above with a trailing `.gz`
pub fn open_rows<P: AsRef<Path>>(path: P) -> Result<Box<dyn RowReader>> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;
    info!("Opening input: {:?} (format: {:?})", path, format);

    match format {
        InputFormat::Jsonl => Ok(Box::new(JsonlRowReader {
            reader: JsonlReader::open(path)?,
        })),
        InputFormat::Text => {
            let (source, total_bytes) = open_source(path)?;
            Ok(Box::new(TextLineReader::new(source, total_bytes)))
        }
        InputFormat::Json => {
            let mut text = String::new();
            open_source(path)?.0.read_to_string(&mut text)?;
            let total_bytes = text.len() as u64;

            if text.trim_start().starts_with('[') {
                let rows: Vec<Value> = serde_json::from_str(&text)?;
                Ok(Box::new(JsonArrayReader::new(rows, total_bytes)))
            } else {
                let reader: Box<dyn Read> = Box::new(Cursor::new(text.into_bytes()));
                Ok(Box::new(JsonlRowReader {
                    reader: JsonlReader::new(reader),
                }))
            }
        }
    }
}
