//! Trust anchors for S/MIME verification
//!
//! A [`TrustStore`] holds the certificates a caller accepts, either as
//! signers themselves or as issuers of signers. Population is the host's
//! job; the verifier only reads the store.

pub mod error;
pub mod store;

pub use error::{Error, Result};
pub use store::TrustStore;
