//! Error types for smime-crypto

use thiserror::Error;

/// Errors that can occur in digest and signature operations
#[derive(Error, Debug)]
pub enum Error {
    /// The signature does not verify under the given key
    #[error("Verification error: {0}")]
    Verification(String),

    /// Algorithm or key type outside the supported set
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Public key material that cannot be used
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Certificate fields needed for a chain check are unusable
    #[error("Certificate error: {0}")]
    InvalidCertificate(String),
}

impl From<aws_lc_rs::error::Unspecified> for Error {
    fn from(_: aws_lc_rs::error::Unspecified) -> Self {
        Error::Verification("unspecified error".to_string())
    }
}

impl From<smime_types::Error> for Error {
    fn from(e: smime_types::Error) -> Self {
        match e {
            smime_types::Error::InvalidCertificate(msg) => Error::InvalidCertificate(msg),
            smime_types::Error::UnsupportedDigest(oid) => Error::UnsupportedAlgorithm(oid),
        }
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
