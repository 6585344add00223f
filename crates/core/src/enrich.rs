//! Search-volume enrichment from uploaded metadata

use crate::record::KeywordRecord;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Per-keyword metadata supplied alongside an upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<u64>,
}

/// Metadata keyed by lowercased, trimmed keyword text
pub type MetadataMap = AHashMap<String, KeywordMeta>;

/// Lookup key for a keyword in a [`MetadataMap`]
pub fn meta_key(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Record a volume for `keyword` unless one is already present.
///
/// Returns `true` when the volume was stored. Empty keywords are ignored.
pub fn insert_volume(meta: &mut MetadataMap, keyword: &str, volume: u64) -> bool {
    let key = meta_key(keyword);
    if key.is_empty() {
        return false;
    }
    let entry = meta.entry(key).or_default();
    if entry.search_volume.is_some() {
        return false;
    }
    entry.search_volume = Some(volume);
    true
}

/// Overwrite search volumes from `meta` and return the enriched copies.
///
/// A record keeps its own volume when it has no entry or the entry carries
/// no volume. The input slice is left untouched.
pub fn enrich(records: &[KeywordRecord], meta: Option<&MetadataMap>) -> Vec<KeywordRecord> {
    let Some(meta) = meta else {
        return records.to_vec();
    };

    records
        .iter()
        .map(|record| {
            let mut enriched = record.clone();
            if let Some(volume) = meta
                .get(&meta_key(&record.keyword))
                .and_then(|entry| entry.search_volume)
            {
                enriched.search_volume = Some(volume);
            }
            enriched
        })
        .collect()
}
