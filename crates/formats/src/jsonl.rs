//! Streaming JSONL (JSON Lines) reader
//!
//! Reads keyword rows line by line with transparent gzip decompression.
//! Malformed lines are logged and skipped rather than failing the file.

use crate::{Error, Record, Result};
use flate2::read::GzDecoder;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

const BUFFER_SIZE: usize = 64 * 1024;

/// Streaming JSONL reader that processes files line-by-line
pub struct JsonlReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    bytes_read: u64,
    skipped: usize,
    total_bytes: Option<u64>,
}

impl JsonlReader<Box<dyn Read>> {
    /// Open a JSONL file, decompressing when the name ends in `.gz`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let total_bytes = file.metadata()?.len();

        if is_gzip(path) {
            debug!("Opening gzip-compressed JSONL file: {:?}", path);
            let reader: Box<dyn Read> = Box::new(GzDecoder::new(file));
            Ok(Self::with_total(reader, None))
        } else {
            debug!("Opening plain JSONL file: {:?}", path);
            let reader: Box<dyn Read> = Box::new(file);
            Ok(Self::with_total(reader, Some(total_bytes)))
        }
    }
}

impl<R: Read> JsonlReader<R> {
    /// Create a new JSONL reader from any Read source
    pub fn new(reader: R) -> Self {
        Self::with_total(reader, None)
    }

    fn with_total(reader: R, total_bytes: Option<u64>) -> Self {
        Self {
            reader: BufReader::with_capacity(BUFFER_SIZE, reader),
            line_number: 0,
            bytes_read: 0,
            skipped: 0,
            total_bytes,
        }
    }

    /// Get the number of lines processed
    pub fn lines_processed(&self) -> usize {
        self.line_number
    }

    /// Get the number of bytes read
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_read
    }

    /// Lines that were not valid JSON
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Get total file size if known
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }
}

impl<R: Read> Iterator for JsonlReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();

        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None, // EOF
                Ok(n) => {
                    self.bytes_read += n as u64;
                    self.line_number += 1;

                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<Value>(trimmed) {
                        Ok(value) => return Some(Ok(Record::new(value, self.line_number))),
                        Err(e) => {
                            warn!(
                                "Skipping malformed JSON at line {}: {}",
                                self.line_number, e
                            );
                            self.skipped += 1;
                            continue;
                        }
                    }
                }
                Err(e) => {
                    return Some(Err(Error::Io(e)));
                }
            }
        }
    }
}

/// Whether the file name ends in `.gz`
pub(crate) fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_jsonl_reader_basic() {
        let data = r#"{"keyword": "dog treats", "searchVolume": 1}
{"keyword": "cat toys"}
{"keyword": "bird cage"}"#;

        let records: Vec<_> = JsonlReader::new(data.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].data["keyword"], "dog treats");
        assert_eq!(records[2].source_line, 3);
    }

    #[test]
    fn test_jsonl_reader_skips_empty_and_malformed_lines() {
        let data = r#"{"keyword": "dog treats"}

{invalid json}
{"keyword": "cat toys"}
"#;

        let mut reader = JsonlReader::new(data.as_bytes());
        let records: Vec<_> = reader.by_ref().collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].data["keyword"], "cat toys");
        assert_eq!(records[1].source_line, 4);
        assert_eq!(reader.skipped_lines(), 1);
    }

    #[test]
    fn test_jsonl_reader_progress_tracking() {
        let data = "{\"keyword\": \"a\"}\n{\"keyword\": \"b\"}";
        let mut reader = JsonlReader::new(data.as_bytes());

        assert_eq!(reader.lines_processed(), 0);
        assert_eq!(reader.bytes_processed(), 0);

        let _ = reader.next();
        assert_eq!(reader.lines_processed(), 1);
        assert!(reader.bytes_processed() > 0);
    }

    #[test]
    fn test_jsonl_reader_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.jsonl.gz");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            writeln!(encoder, r#"{{"keyword": "compressed"}}"#).unwrap();
            writeln!(encoder, r#"{{"keyword": "data"}}"#).unwrap();
            encoder.finish().unwrap();
        }

        let reader = JsonlReader::open(&path).unwrap();
        assert!(reader.total_bytes().is_none());
        let records: Vec<_> = reader.collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data["keyword"], "compressed");
    }
}
