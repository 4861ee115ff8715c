//! S/MIME message framing
//!
//! This crate splits `multipart/signed` messages into their signed content
//! and signature parts, recovers the signed bytes exactly as transmitted and
//! transfer-decodes the SignedData envelope. It also reads opaque
//! `application/pkcs7-mime` messages.
//!
//! # Example
//!
//! ```no_run
//! use smime_mime::{parse, Canonicalization};
//!
//! # fn example(raw: &[u8]) -> Result<(), smime_mime::ParseError> {
//! let message = parse(raw)?;
//! let signed = message.signed_content(Canonicalization::Exact);
//! let envelope = message.envelope();
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod error;
pub mod header;
pub mod multipart;

pub use canonical::{canonicalize, Canonicalization};
pub use error::{ParseError, Result};
pub use header::{ContentType, Header, Headers};
pub use multipart::{
    parse, parse_with_content_type, read_smime, MimePart, OpaqueMessage, SignedMessage,
    SmimeMessage,
};
