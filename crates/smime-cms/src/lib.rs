//! PKCS7 / CMS SignedData decoding for S/MIME
//!
//! Envelopes are attacker-supplied, so decoding happens in two passes: a
//! structural scan of the TLV tree under [`DecoderLimits`], then typed
//! decoding into the owned model in [`signed_data`]. Every failure is a
//! [`DecodeError`].
//!
//! # Example
//!
//! ```no_run
//! use smime_cms::decode;
//!
//! # fn example(envelope: &[u8]) -> Result<(), smime_cms::DecodeError> {
//! let signed_data = decode(envelope)?;
//! for signer in signed_data.signer_infos() {
//!     println!("signed by {}", signer.signer_id());
//! }
//! # Ok(())
//! # }
//! ```

mod asn1;
pub mod decode;
pub mod error;
mod scan;
pub mod signed_data;

pub use decode::{decode, Decoder, DecoderLimits};
pub use error::{DecodeError, Result};
pub use signed_data::{
    AlgorithmId, AuthenticatedAttributes, SignedData, SignerId, SignerInfo, OID_CONTENT_TYPE,
    OID_DATA, OID_MESSAGE_DIGEST, OID_SIGNED_DATA, OID_SIGNING_TIME,
};
