//! Column auto-detection for keyword exports
//!
//! Keyword tools name their columns inconsistently ("Keyword", "Search
//! term", "Avg. monthly searches", "MSV"...). The keyword column is found by
//! name; the volume column is scored by name and by how numeric its first
//! rows look.

use crate::Record;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Substrings that mark a keyword column, in priority order
const KEYWORD_PATTERNS: &[&str] = &[
    "keyword",
    "keywords",
    "search term",
    "search terms",
    "query",
    "queries",
    "term",
    "terms",
];

/// Fields of an analyzed keyword record that are never volume columns
const ANALYSIS_FIELDS: &[&str] = &["type", "score", "reasoning"];

/// Rows inspected when scoring column contents
const SAMPLE_ROWS: usize = 100;

static STRONG_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static MEDIUM_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static TOKEN_SPLIT: OnceLock<Regex> = OnceLock::new();

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("Failed to compile column pattern"))
        .collect()
}

fn strong_patterns() -> &'static [Regex] {
    STRONG_PATTERNS.get_or_init(|| {
        compile(&[
            r"monthly\s*search\s*volume\s*exact",
            r"monthly\s*search\s*volume",
            r"\bmsv\b",
            r"avg(eral|\.)?\s*monthly\s*search(es)?",
        ])
    })
}

fn medium_patterns() -> &'static [Regex] {
    MEDIUM_PATTERNS.get_or_init(|| {
        compile(&[
            r"search\s*volume",
            r"search_volume",
            r"search\s*vol",
            r"search(es)?\b",
            r"search\s*count",
        ])
    })
}

fn token_split() -> &'static Regex {
    TOKEN_SPLIT.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("Failed to compile token regex"))
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Parse a volume-like value; commas and whitespace are ignored
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Parse a search volume; negative values are rejected, fractions rounded
pub fn parse_volume(value: &Value) -> Option<u64> {
    let number = parse_number(value)?;
    if number < 0.0 {
        return None;
    }
    Some(number.round() as u64)
}

/// First header containing a keyword pattern (patterns tried in order),
/// otherwise the first header
pub fn detect_keyword_column(headers: &[String]) -> Option<String> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    for pattern in KEYWORD_PATTERNS {
        if let Some(idx) = normalized.iter().position(|h| h.contains(pattern)) {
            return Some(headers[idx].clone());
        }
    }
    headers.first().cloned()
}

/// Score a header name as a search-volume column
pub fn header_score(header: &str) -> i32 {
    let normalized = normalize_header(header);
    let tokens: Vec<&str> = token_split()
        .split(&normalized)
        .filter(|t| !t.is_empty())
        .collect();

    let mut score = 0;
    if strong_patterns().iter().any(|rx| rx.is_match(&normalized)) {
        score += 5;
    }
    if medium_patterns().iter().any(|rx| rx.is_match(&normalized)) {
        score += 3;
    }
    if tokens.contains(&"sv") || tokens.contains(&"msv") {
        score += 2;
    }
    for token in ["volume", "monthly", "exact"] {
        if tokens.contains(&token) {
            score += 1;
        }
    }
    score
}

/// Score a column's contents over the sampled rows
pub fn data_score(header: &str, rows: &[Record]) -> i32 {
    let mut total = 0usize;
    let mut numeric = 0usize;
    let mut large = false;

    for row in rows.iter().take(SAMPLE_ROWS) {
        let Some(value) = row.get(header) else {
            continue;
        };
        total += 1;
        if let Some(number) = parse_number(value) {
            numeric += 1;
            large |= number >= 1000.0;
        }
    }

    if total == 0 {
        return 0;
    }
    let ratio = numeric as f64 / total as f64;
    let mut score = if ratio >= 0.7 {
        2
    } else if ratio >= 0.4 {
        1
    } else {
        0
    };
    if large {
        score += 1;
    }
    score
}

/// Best-scoring search-volume column, if any scores above zero
///
/// Headers in `exclude` are never chosen. Ties go to the earlier header.
pub fn detect_volume_column(headers: &[String], rows: &[Record], exclude: &[&str]) -> Option<String> {
    let mut best: Option<(&String, i32)> = None;
    for header in headers {
        if exclude.contains(&header.as_str()) {
            continue;
        }
        let score = header_score(header) + data_score(header, rows);
        debug!("Volume column candidate {:?} scored {}", header, score);
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((header, score));
        }
    }
    best.map(|(header, _)| header.clone())
}

/// Which input fields hold the keyword and its search volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub keyword: String,
    pub volume: Option<String>,
}

impl ColumnMapping {
    /// Detect both columns from headers and sample rows
    ///
    /// The keyword column and the analysis fields (`type`, `score`,
    /// `reasoning`) are never taken for the volume.
    pub fn detect(headers: &[String], rows: &[Record]) -> Option<Self> {
        let keyword = detect_keyword_column(headers)?;
        let mut exclude = vec![keyword.as_str()];
        exclude.extend_from_slice(ANALYSIS_FIELDS);
        let volume = detect_volume_column(headers, rows, &exclude);
        debug!("Detected columns: keyword={:?} volume={:?}", keyword, volume);
        Some(Self { keyword, volume })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keyword_column_by_pattern_priority() {
        assert_eq!(
            detect_keyword_column(&headers(&["Volume", "Search Term", "Keyword"])).as_deref(),
            Some("Keyword")
        );
        assert_eq!(
            detect_keyword_column(&headers(&["id", "Query "])).as_deref(),
            Some("Query ")
        );
    }

    #[test]
    fn test_keyword_column_falls_back_to_first() {
        assert_eq!(detect_keyword_column(&headers(&["phrase", "count"])).as_deref(), Some("phrase"));
        assert_eq!(detect_keyword_column(&[]), None);
    }

    #[test]
    fn test_header_scores() {
        assert_eq!(header_score("Monthly Search Volume Exact"), 5 + 3 + 3);
        assert_eq!(header_score("MSV"), 5 + 2);
        assert_eq!(header_score("Avg. monthly searches"), 5 + 3 + 1);
        assert_eq!(header_score("search_volume"), 3 + 1);
        assert_eq!(header_score("SV"), 2);
        assert_eq!(header_score("Volume"), 1);
        assert_eq!(header_score("CPC"), 0);
    }

    #[test]
    fn test_data_score() {
        let rows: Vec<Record> = (0..10)
            .map(|i| {
                let b = if i < 5 { "7" } else { "x" };
                Record::new(json!({"a": format!("{},500", i), "b": b, "c": "text"}), i)
            })
            .collect();
        assert_eq!(data_score("a", &rows), 3);
        assert_eq!(data_score("b", &rows), 1);
        assert_eq!(data_score("c", &rows), 0);
        assert_eq!(data_score("missing", &rows), 0);
    }

    #[test]
    fn test_volume_column_detection() {
        let rows: Vec<Record> = (0..5)
            .map(|i| {
                Record::new(
                    json!({"Keyword": format!("kw {}", i), "CPC": "1.20", "Search Volume": format!("{}", i * 2000)}),
                    i,
                )
            })
            .collect();
        let cols = headers(&["Keyword", "CPC", "Search Volume"]);

        let mapping = ColumnMapping::detect(&cols, &rows).unwrap();
        assert_eq!(mapping.keyword, "Keyword");
        assert_eq!(mapping.volume.as_deref(), Some("Search Volume"));
    }

    #[test]
    fn test_no_volume_column() {
        let rows = vec![Record::new(json!({"Keyword": "dog treats", "Notes": "n/a"}), 1)];
        let cols = headers(&["Keyword", "Notes"]);
        assert_eq!(detect_volume_column(&cols, &rows, &["Keyword"]), None);
    }

    #[test]
    fn test_score_field_is_not_a_volume() {
        let rows = vec![Record::new(json!({"keyword": "x", "type": "generic", "score": 7}), 1)];
        let cols = headers(&["keyword", "type", "score"]);
        assert_eq!(ColumnMapping::detect(&cols, &rows).unwrap().volume, None);
    }

    #[test]
    fn test_volume_ties_go_to_first_header() {
        let rows = vec![Record::new(json!({"kw": "x", "Volume A": "5", "Volume B": "5"}), 1)];
        let cols = headers(&["kw", "Volume A", "Volume B"]);
        assert_eq!(detect_volume_column(&cols, &rows, &["kw"]).as_deref(), Some("Volume A"));
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume(&json!("12,500")), Some(12500));
        assert_eq!(parse_volume(&json!(" 1 000 ")), Some(1000));
        assert_eq!(parse_volume(&json!(880)), Some(880));
        assert_eq!(parse_volume(&json!(12.6)), Some(13));
        assert_eq!(parse_volume(&json!("-5")), None);
        assert_eq!(parse_volume(&json!("n/a")), None);
        assert_eq!(parse_volume(&json!("")), None);
        assert_eq!(parse_volume(&Value::Null), None);
    }
}
