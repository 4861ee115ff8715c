//! S/MIME signature verification
//!
//! This is the main entry point of the workspace. It ties MIME framing,
//! SignedData decoding, trust evaluation and signature checks together and
//! returns a [`VerificationVerdict`] that always carries a reason on failure.
//!
//! # Example
//!
//! ```no_run
//! use smime_verify::trust::TrustStore;
//! use smime_verify::{Verifier, VerifyOptions};
//!
//! # fn example(raw: &[u8], anchor_der: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = TrustStore::new();
//! store.add_der(anchor_der)?;
//!
//! let verifier = Verifier::with_options(store, VerifyOptions::default().at_current_time());
//! let verdict = verifier.verify_message(raw)?;
//! if let Some(reason) = verdict.failure() {
//!     eprintln!("rejected: {}", reason);
//! }
//! # Ok(())
//! # }
//! ```

mod chain;
pub mod error;
pub mod options;
mod signer;
pub mod verdict;
pub mod verify;

// Re-export component crates
pub use smime_cms as cms;
pub use smime_crypto as crypto;
pub use smime_mime as mime;
pub use smime_trust as trust;
pub use smime_types as types;

pub use error::{Error, Result};
pub use options::VerifyOptions;
pub use verdict::{
    CryptoError, FailureReason, SignerSummary, TrustError, TrustPath, VerificationReport,
    VerificationVerdict,
};
pub use verify::{
    get_signers, verify, verify_detailed, verify_embedded, verify_message, Verifier,
};
