//! Error types for refdup-core

use refdup_bibtex::ParseError;
use thiserror::Error;

/// Result type alias for duplicate detection
pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors surfaced by duplicate detection
///
/// Malformed entries never show up here; the parser skips them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// The document was empty or blank
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ParseError> for DetectError {
    fn from(err: ParseError) -> Self {
        DetectError::InvalidInput(err.to_string())
    }
}

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),
}
