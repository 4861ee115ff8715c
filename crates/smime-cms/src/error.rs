//! Error types for smime-cms

use der::ErrorKind;
use thiserror::Error;

/// Errors that can occur while decoding a SignedData envelope
///
/// Every malformed input maps onto one of these variants; decoding never
/// panics on attacker-supplied bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before a value was complete, or a length field points
    /// past the end of the buffer
    #[error("Envelope is truncated")]
    Truncated,

    /// A value carried a tag the structure does not allow at that position
    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    /// Bytes follow the outer ContentInfo
    #[error("Trailing data after envelope")]
    TrailingData,

    /// SignedData version outside 1, 3, 4, 5
    #[error("Unsupported SignedData version: {0}")]
    UnsupportedVersion(u32),

    /// BER indefinite-length encoding
    #[error("Indefinite-length encoding is not allowed")]
    IndefiniteLength,

    /// The envelope exceeds a configured decoder limit
    #[error("Decoder limit exceeded: {0}")]
    LimitExceeded(String),

    /// The ContentInfo does not wrap id-signedData
    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// SignedData has an empty SignerInfos set
    #[error("SignedData has no SignerInfos")]
    MissingSignerInfos,

    /// Any other structural or semantic violation
    #[error("Malformed envelope: {0}")]
    Malformed(String),
}

impl From<der::Error> for DecodeError {
    fn from(err: der::Error) -> Self {
        match err.kind() {
            ErrorKind::Incomplete { .. } | ErrorKind::Overlength => DecodeError::Truncated,
            ErrorKind::TrailingData { .. } => DecodeError::TrailingData,
            ErrorKind::TagUnexpected { .. }
            | ErrorKind::TagUnknown { .. }
            | ErrorKind::TagNumberInvalid
            | ErrorKind::TagModeUnknown => DecodeError::InvalidTag(err.to_string()),
            _ => DecodeError::Malformed(err.to_string()),
        }
    }
}

/// Result type for envelope decoding
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use der::{Length, Tag};

    #[test]
    fn test_der_error_mapping() {
        let incomplete: der::Error = ErrorKind::Incomplete {
            expected_len: Length::new(10),
            actual_len: Length::new(4),
        }
        .into();
        assert_eq!(DecodeError::from(incomplete), DecodeError::Truncated);

        let unexpected: der::Error = ErrorKind::TagUnexpected {
            expected: Some(Tag::Sequence),
            actual: Tag::Set,
        }
        .into();
        assert!(matches!(
            DecodeError::from(unexpected),
            DecodeError::InvalidTag(_)
        ));

        let ordering: der::Error = ErrorKind::SetOrdering.into();
        assert!(matches!(
            DecodeError::from(ordering),
            DecodeError::Malformed(_)
        ));
    }
}
