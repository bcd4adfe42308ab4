// Error type shared by headers, data sources and the registry.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("header keyword '{0}' not found")]
    MissingKey(String),

    #[error("header keyword '{key}' is a {found}, expected a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot parse observation date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("no registered data source recognises this header")]
    NoMatchingSource,
}

/// Result type alias using SourceError
pub type Result<T> = std::result::Result<T, SourceError>;
