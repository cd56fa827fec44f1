//! Error types for signal matching and handler construction

use thiserror::Error;

/// Core error type for matcher and handler operations
#[derive(Error, Debug)]
pub enum SignalError {
    /// A block or item type name that the catalog does not know
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// A variant name that the catalog does not know
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    /// Parameters were well-formed but semantically unusable
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Parameter record had the wrong shape
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration document could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for signal operations
pub type Result<T> = std::result::Result<T, SignalError>;
