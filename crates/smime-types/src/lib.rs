//! Core types for S/MIME signature verification
//!
//! This crate provides the data structures shared by the parser, decoder,
//! trust store and verifier crates: an owned certificate handle and the
//! digest algorithm identifiers used throughout.

pub mod certificate;
pub mod digest;
pub mod error;

pub use certificate::Certificate;
pub use digest::{DigestAlgorithm, OID_SHA256, OID_SHA384, OID_SHA512};
pub use error::{Error, Result};
