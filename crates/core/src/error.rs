//! Error types for the keyword grouping engine

use thiserror::Error;

/// Core grouping errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Processing cancelled")]
    Cancelled,

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Keyword processor is shut down")]
    ProcessorClosed,

    #[error("A processing request is already in flight")]
    Busy,

    #[error("No processing request in flight")]
    NotProcessing,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Normalizer(#[from] kwgroup_filters::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
