//! Cryptographic primitives for S/MIME verification
//!
//! This crate provides content digests, signature scheme resolution and
//! signature verification using aws-lc-rs as the cryptographic backend.

pub mod error;
pub mod hash;
pub mod scheme;
pub mod verification;
pub mod x509;

pub use error::{Error, Result};
pub use hash::digest;
pub use scheme::SigningScheme;
pub use verification::{verify_signature, VerificationKey};
pub use x509::verify_issued_by;
