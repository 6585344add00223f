//! Strict phrase-variation test built on canonical keys

use kwgroup_filters::{normalize_phrase, PhraseNormalizer};

/// Whether two keywords are the same phrase under the default normalizer
///
/// Keys must be equal and non-empty: word order matters and an extra
/// modifier makes a different phrase.
pub fn are_variations(a: &str, b: &str) -> bool {
    let key = normalize_phrase(a);
    VariationClassifier::is_comparable(&key) && key == normalize_phrase(b)
}

/// Variation classifier bound to a configured normalizer
#[derive(Debug, Clone, Default)]
pub struct VariationClassifier {
    normalizer: PhraseNormalizer,
}

impl VariationClassifier {
    pub fn new(normalizer: PhraseNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &PhraseNormalizer {
        &self.normalizer
    }

    /// Empty keys never match anything, not even another empty key
    pub fn is_comparable(key: &str) -> bool {
        !key.is_empty()
    }

    pub fn are_variations(&self, a: &str, b: &str) -> bool {
        let key = self.normalizer.normalize(a);
        Self::is_comparable(&key) && key == self.normalizer.normalize(b)
    }

    /// 1.0 for variations of the same phrase, 0.0 otherwise
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        if self.are_variations(a, b) {
            1.0
        } else {
            0.0
        }
    }
}
