//! Error types for phrase normalization

use thiserror::Error;

/// Normalizer errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for normalizer operations
pub type Result<T> = std::result::Result<T, Error>;
