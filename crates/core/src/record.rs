//! Keyword records and keyword groups

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Classification assigned by the scoring backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordType {
    #[default]
    Generic,
    OurBrand,
    CompetitorBrand,
}

impl KeywordType {
    pub const ALL: [KeywordType; 3] = [
        KeywordType::Generic,
        KeywordType::OurBrand,
        KeywordType::CompetitorBrand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordType::Generic => "generic",
            KeywordType::OurBrand => "our_brand",
            KeywordType::CompetitorBrand => "competitor_brand",
        }
    }
}

fn default_score() -> f64 {
    1.0
}

/// One analyzed keyword
///
/// `score` is promised to be 1–10 by the scoring backend; nothing in the
/// grouping engine relies on that, see [`clamp_score`] for boundary checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub keyword: String,
    #[serde(rename = "type", default)]
    pub keyword_type: KeywordType,
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(default)]
    pub reasoning: String,
    /// Unknown when `None`; ranks as zero but is never reported as zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<u64>,
}

impl KeywordRecord {
    /// Generic keyword with the lowest score and no volume
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            keyword_type: KeywordType::Generic,
            score: default_score(),
            reasoning: String::new(),
            search_volume: None,
        }
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.search_volume = Some(volume);
        self
    }

    pub fn with_type(mut self, keyword_type: KeywordType) -> Self {
        self.keyword_type = keyword_type;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Volume used for ordering; unknown volume ranks as zero
    pub fn ranking_volume(&self) -> u64 {
        self.search_volume.unwrap_or(0)
    }
}

/// Clamp a backend score into the 1–10 contract range.
///
/// Zero and non-finite scores are treated as missing and become 1.
pub fn clamp_score(score: f64) -> f64 {
    if !score.is_finite() || score == 0.0 {
        return 1.0;
    }
    score.clamp(1.0, 10.0)
}

/// A cluster of phrase variations with its representative parent
///
/// The variation count is derived from `variations`, so it can't drift out
/// of sync.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordGroup {
    parent: KeywordRecord,
    variations: Vec<KeywordRecord>,
    lemma: String,
}

impl KeywordGroup {
    pub(crate) fn new(parent: KeywordRecord, lemma: String) -> Self {
        Self {
            parent,
            variations: Vec::new(),
            lemma,
        }
    }

    pub(crate) fn push_variation(&mut self, record: KeywordRecord) {
        self.variations.push(record);
    }

    pub fn parent(&self) -> &KeywordRecord {
        &self.parent
    }

    pub fn variations(&self) -> &[KeywordRecord] {
        &self.variations
    }

    /// Canonical key shared by every member
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn total_variations(&self) -> usize {
        self.variations.len()
    }

    /// Number of keywords in the group, parent included
    pub fn keyword_count(&self) -> usize {
        1 + self.variations.len()
    }

    /// Parent first, then variations in order
    pub fn members(&self) -> impl Iterator<Item = &KeywordRecord> {
        std::iter::once(&self.parent).chain(self.variations.iter())
    }
}

impl Serialize for KeywordGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("KeywordGroup", 4)?;
        state.serialize_field("parent", &self.parent)?;
        state.serialize_field("variations", &self.variations)?;
        state.serialize_field("lemma", &self.lemma)?;
        state.serialize_field("totalVariations", &self.total_variations())?;
        state.end()
    }
}
