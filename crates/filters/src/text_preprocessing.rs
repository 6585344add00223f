//! Phrase cleaning and canonical-key normalization
//!
//! A keyword's canonical key is built by cleaning the raw text, dropping
//! stop words and lemmatizing the remaining tokens in their original order.
//! Two keywords with the same non-empty key are the same phrase.

use crate::lemmatize::Lemmatizer;
use crate::stop_words::stop_word_set;
use crate::{Error, Result};
use ahash::{AHashMap, AHashSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

// Lazy-initialized regexes for cleaning
static PUNCTUATION_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static DEFAULT_NORMALIZER: OnceLock<PhraseNormalizer> = OnceLock::new();

fn get_punctuation_regex() -> &'static Regex {
    // Apostrophes survive so possessives can be lemmatized
    PUNCTUATION_REGEX.get_or_init(|| {
        Regex::new(r#"["()+*,.:;!?/#]"#).expect("Failed to compile punctuation regex")
    })
}

fn get_whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| {
        Regex::new(r"\s+").expect("Failed to compile whitespace regex")
    })
}

/// Lowercase, replace keyword punctuation with spaces, collapse whitespace
/// and trim.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let spaced = get_punctuation_regex().replace_all(&lowered, " ");
    get_whitespace_regex()
        .replace_all(&spaced, " ")
        .trim()
        .to_string()
}

/// Normalize a phrase with the default English configuration
pub fn normalize_phrase(phrase: &str) -> String {
    DEFAULT_NORMALIZER
        .get_or_init(PhraseNormalizer::default)
        .normalize(phrase)
}

/// Normalizer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Also map irregular plurals such as teeth→tooth and mice→mouse
    pub extended_irregulars: bool,
    /// Stop words added on top of the built-in English list
    pub extra_stop_words: Vec<String>,
    /// Extra irregular singulars, token → lemma
    pub extra_irregulars: BTreeMap<String, String>,
}

impl NormalizerConfig {
    /// Check that every configured word is a single non-empty token
    pub fn validate(&self) -> Result<()> {
        for word in &self.extra_stop_words {
            if word.trim().contains(char::is_whitespace) {
                return Err(Error::InvalidConfig(format!(
                    "stop word '{}' must be a single token",
                    word
                )));
            }
        }
        for (from, to) in &self.extra_irregulars {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "irregular mapping '{}' -> '{}' has an empty side",
                    from, to
                )));
            }
            if from.trim().contains(char::is_whitespace) {
                return Err(Error::InvalidConfig(format!(
                    "irregular word '{}' must be a single token",
                    from
                )));
            }
        }
        Ok(())
    }
}

/// Reduces keyword phrases to canonical comparison keys
///
/// Immutable once built, so one normalizer can be shared across threads.
/// Memoization lives in [`NormalizationCache`], which is scoped to a single
/// grouping run.
#[derive(Debug, Clone)]
pub struct PhraseNormalizer {
    stop_words: AHashSet<String>,
    lemmatizer: Lemmatizer,
}

impl PhraseNormalizer {
    /// Build a normalizer from configuration
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        config.validate()?;

        let mut lemmatizer = Lemmatizer::new();
        if config.extended_irregulars {
            lemmatizer = lemmatizer.with_extended_irregulars();
        }
        for (from, to) in &config.extra_irregulars {
            lemmatizer = lemmatizer.with_irregular(from, to);
        }

        let stop_words = stop_word_set(&config.extra_stop_words);
        debug!(
            "Built phrase normalizer: {} stop words, {} irregulars",
            stop_words.len(),
            lemmatizer.irregular_count()
        );

        Ok(Self {
            stop_words,
            lemmatizer,
        })
    }

    /// Whether a cleaned token is ignored during comparison
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Clean and tokenize a phrase, dropping stop words and empty tokens.
    /// Word order is preserved.
    pub fn meaningful_words(&self, phrase: &str) -> Vec<String> {
        clean_text(phrase)
            .split(' ')
            .filter(|token| !token.is_empty() && !self.is_stop_word(token))
            .map(str::to_string)
            .collect()
    }

    /// Canonical key for a phrase
    ///
    /// Returns an empty string when nothing meaningful is left; callers must
    /// never treat two empty keys as a match. A token that lemmatizes to
    /// nothing (a lone `s` or `'s`) keeps its slot, so `size s shirt` and
    /// `size shirt` stay apart.
    pub fn normalize(&self, phrase: &str) -> String {
        let lemmas: Vec<String> = self
            .meaningful_words(phrase)
            .iter()
            .map(|word| self.lemmatizer.lemmatize(word))
            .collect();
        lemmas.join(" ")
    }

    /// Start a fresh memoization cache bound to this normalizer
    pub fn cache(&self) -> NormalizationCache<'_> {
        NormalizationCache::new(self)
    }
}

impl Default for PhraseNormalizer {
    fn default() -> Self {
        Self {
            stop_words: stop_word_set(Vec::<String>::new()),
            lemmatizer: Lemmatizer::new(),
        }
    }
}

/// Memoizes canonical keys by raw input string for one grouping run
pub struct NormalizationCache<'a> {
    normalizer: &'a PhraseNormalizer,
    memo: AHashMap<String, String>,
    hits: usize,
    misses: usize,
}

impl<'a> NormalizationCache<'a> {
    /// Create an empty cache
    pub fn new(normalizer: &'a PhraseNormalizer) -> Self {
        Self {
            normalizer,
            memo: AHashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Canonical key for `phrase`, computed at most once per distinct input
    pub fn normalize(&mut self, phrase: &str) -> &str {
        if self.memo.contains_key(phrase) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let key = self.normalizer.normalize(phrase);
            self.memo.insert(phrase.to_string(), key);
        }
        &self.memo[phrase]
    }

    /// Number of distinct phrases cached
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Lookups answered from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to normalize
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drop every memoized key and reset counters
    pub fn clear(&mut self) {
        self.memo.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
