//! Placeholder analysis results for when no scoring backend is reachable

use crate::record::{KeywordRecord, KeywordType};
use rand::Rng;

/// Random analysis for a single keyword
pub fn mock_record<R: Rng + ?Sized>(keyword: &str, rng: &mut R) -> KeywordRecord {
    let keyword_type = KeywordType::ALL[rng.gen_range(0..KeywordType::ALL.len())];
    let score = rng.gen_range(1..=10) as f64;

    KeywordRecord::new(keyword)
        .with_type(keyword_type)
        .with_score(score)
        .with_reasoning(format!(
            "Mock analysis for \"{}\": This is demo data as the API is not connected.",
            keyword
        ))
}

/// One random record per keyword, in input order
pub fn mock_results<R: Rng + ?Sized>(keywords: &[String], rng: &mut R) -> Vec<KeywordRecord> {
    keywords
        .iter()
        .map(|keyword| mock_record(keyword, rng))
        .collect()
}
