//! Error types for smime-types

use thiserror::Error;

/// Errors that can occur when building core types
#[derive(Error, Debug)]
pub enum Error {
    /// Certificate parsing error
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Digest algorithm is not one of the supported SHA-2 variants
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedDigest(String),
}

/// Result type for smime-types operations
pub type Result<T> = std::result::Result<T, Error>;
