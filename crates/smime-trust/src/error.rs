//! Error types for trust store operations

use thiserror::Error;

/// Errors that can occur while populating a trust store
#[derive(Debug, Error)]
pub enum Error {
    /// Certificate bytes could not be decoded
    #[error("failed to parse certificate: {0}")]
    Certificate(String),
}

impl From<smime_types::Error> for Error {
    fn from(e: smime_types::Error) -> Self {
        Error::Certificate(e.to_string())
    }
}

/// Result type for trust store operations
pub type Result<T> = std::result::Result<T, Error>;
