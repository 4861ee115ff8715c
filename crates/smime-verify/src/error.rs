//! Error types for smime-verify
//!
//! A message that fails to verify is not an error; it yields a
//! [`crate::VerificationVerdict::Failed`]. Errors are reserved for input
//! that cannot be framed or decoded at all.

use thiserror::Error;

/// Errors that prevent verification from starting
#[derive(Error, Debug)]
pub enum Error {
    /// MIME framing error
    #[error("MIME error: {0}")]
    Parse(#[from] smime_mime::ParseError),

    /// SignedData decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] smime_cms::DecodeError),
}

/// Result type for smime-verify operations
pub type Result<T> = std::result::Result<T, Error>;
