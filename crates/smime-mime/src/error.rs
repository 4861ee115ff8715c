//! Error types for smime-mime

use thiserror::Error;

/// Errors that can occur while parsing S/MIME framing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The multipart Content-Type carries no boundary parameter
    #[error("Content-Type has no boundary parameter")]
    MissingBoundary,

    /// Framing does not follow RFC 2045/2046 (bad headers, missing
    /// delimiters, wrong part count)
    #[error("Malformed MIME message: {0}")]
    Malformed(String),

    /// The signature part could not be decoded from its transfer encoding
    #[error("Invalid transfer encoding: {0}")]
    BadEncoding(String),

    /// Top-level content type is neither multipart/signed nor pkcs7-mime
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Transfer encoding other than base64/7bit/8bit/binary
    #[error("Unsupported Content-Transfer-Encoding: {0}")]
    UnsupportedTransferEncoding(String),

    /// Text extraction requested for content that is not text/plain
    #[error("Signed content is not text/plain: {0}")]
    NotTextPlain(String),
}

/// Result type for MIME parsing
pub type Result<T> = std::result::Result<T, ParseError>;
