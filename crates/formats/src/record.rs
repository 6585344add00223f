//! One raw row from an input file

use serde_json::Value;

/// A single row as read from disk, before column mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The JSON data for this row
    pub data: Value,
    /// Source line number or array index, 1-based
    pub source_line: usize,
}

impl Record {
    pub fn new(data: Value, source_line: usize) -> Self {
        Self { data, source_line }
    }

    /// Field names in file order; empty for non-object rows
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.data
            .as_object()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Field rendered as trimmed text; strings as-is, numbers and booleans
    /// formatted, null and nested values treated as absent
    pub fn text(&self, field: &str) -> Option<String> {
        let text = match self.get(field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
