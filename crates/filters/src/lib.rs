//! Keyword phrase normalization
//!
//! Reduces raw search keywords to canonical, order-preserving comparison
//! keys: punctuation cleanup, stop-word removal and rule-based
//! lemmatization of plurals, possessives and doubled-consonant gerunds.

pub mod error;
pub mod lemmatize;
pub mod stop_words;
pub mod text_preprocessing;

pub use error::{Error, Result};
pub use lemmatize::{lemmatize_word, Lemmatizer};
pub use text_preprocessing::{
    clean_text, normalize_phrase, NormalizationCache, NormalizerConfig, PhraseNormalizer,
};
