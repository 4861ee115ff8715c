//! Signer certificate lookup and per-signer digest and signature checks

use crate::options::VerifyOptions;
use crate::verdict::{CryptoError, TrustError};
use const_oid::ObjectIdentifier;
use smime_cms::{SignedData, SignerInfo};
use smime_crypto::{SigningScheme, VerificationKey};
use smime_types::{Certificate, DigestAlgorithm};

/// Certificates that may serve as signer or intermediate: the envelope's
/// own (unless disabled) followed by the out-of-band ones
pub(crate) fn candidates<'a>(
    envelope: &'a SignedData,
    options: &'a VerifyOptions,
) -> Vec<&'a Certificate> {
    let embedded: &[Certificate] = if options.use_embedded_certificates {
        envelope.certificates()
    } else {
        &[]
    };
    embedded
        .iter()
        .chain(options.extra_certificates.iter())
        .collect()
}

/// The one candidate certificate a SignerInfo names
///
/// The same certificate arriving through more than one source is not
/// ambiguous; two different certificates are.
pub(crate) fn find_signer_certificate<'a>(
    info: &SignerInfo,
    candidates: &[&'a Certificate],
) -> Result<&'a Certificate, TrustError> {
    let mut found: Option<&'a Certificate> = None;
    for &cert in candidates.iter().filter(|c| info.signer_id().matches(c)) {
        match found {
            None => found = Some(cert),
            Some(previous) if previous == cert => {}
            Some(_) => {
                return Err(TrustError::AmbiguousSigner {
                    signer: info.signer_id().to_string(),
                })
            }
        }
    }
    found.ok_or_else(|| TrustError::SignerCertNotFound {
        signer: info.signer_id().to_string(),
    })
}

/// Digest algorithm of a SignerInfo, if supported
pub(crate) fn digest_algorithm(info: &SignerInfo) -> Result<DigestAlgorithm, CryptoError> {
    info.digest_algorithm().digest_algorithm().ok_or_else(|| {
        CryptoError::Unsupported(format!(
            "digest algorithm {}",
            info.digest_algorithm().oid
        ))
    })
}

/// Check a SignerInfo's digest and signature over `content`
///
/// With signed attributes the message-digest attribute must equal the
/// digest of `content` and the signature covers the attribute set.
/// Without them the signature covers `content` itself.
pub(crate) fn verify_signer_info(
    info: &SignerInfo,
    signer: &Certificate,
    content: &[u8],
    content_type: &ObjectIdentifier,
) -> Result<(), CryptoError> {
    let algorithm = digest_algorithm(info)?;

    let scheme = SigningScheme::resolve(
        &info.signature_algorithm().oid,
        Some(algorithm),
        signer.public_key(),
    )
    .map_err(|e| CryptoError::Unsupported(e.to_string()))?;
    let key = VerificationKey::from_certificate(signer, scheme)
        .map_err(|e| CryptoError::Unsupported(e.to_string()))?;

    let signed_bytes = match info.authenticated_attributes() {
        Some(attrs) => {
            let expected = attrs
                .message_digest()
                .ok_or(CryptoError::MissingMessageDigest)?;
            let computed = smime_crypto::digest(algorithm, content);
            if computed.as_slice() != expected {
                tracing::debug!(
                    algorithm = %algorithm,
                    "content digest does not match message-digest attribute"
                );
                return Err(CryptoError::DigestMismatch { algorithm });
            }

            if let Some(signed_type) = attrs.content_type() {
                if signed_type != content_type {
                    return Err(CryptoError::ContentTypeMismatch {
                        signed: signed_type.to_string(),
                        encapsulated: content_type.to_string(),
                    });
                }
            }

            attrs.signed_bytes()
        }
        None => {
            tracing::debug!("no signed attributes, verifying signature over content");
            content
        }
    };

    tracing::debug!(scheme = %scheme, signer = %signer.subject(), "verifying signature");
    key.verify(signed_bytes, info.signature())
        .map_err(|_| CryptoError::BadSignature {
            subject: signer.subject().to_string(),
        })
}
