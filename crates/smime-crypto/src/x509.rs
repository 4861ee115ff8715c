//! Certificate issuance checks
//!
//! Only the cryptographic link is checked here: that the issuer's key
//! verifies the child's signature over its TBSCertificate. Name matching and
//! validity windows are left to the caller.

use crate::error::{Error, Result};
use crate::scheme::SigningScheme;
use crate::verification::VerificationKey;
use smime_types::Certificate;

/// Check that `issuer`'s public key signed `child`
pub fn verify_issued_by(child: &Certificate, issuer: &Certificate) -> Result<()> {
    let scheme =
        SigningScheme::resolve(&child.signature_algorithm().oid, None, issuer.public_key())?;
    let key = VerificationKey::from_certificate(issuer, scheme)?;

    let tbs = child.tbs_bytes()?;
    let signature = child.signature().ok_or_else(|| {
        Error::InvalidCertificate(format!(
            "signature of \"{}\" has unused bits",
            child.subject()
        ))
    })?;

    tracing::trace!(
        child = %child.subject(),
        issuer = %issuer.subject(),
        scheme = %scheme,
        "checking certificate signature"
    );

    key.verify(tbs, signature)
}
