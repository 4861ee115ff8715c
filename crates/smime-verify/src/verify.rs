//! High-level verification API
//!
//! This module provides the main entry points for verifying S/MIME signed
//! messages against a trust store.

use crate::chain::{check_validity, evaluate_trust};
use crate::error::Result;
use crate::options::VerifyOptions;
use crate::signer::{candidates, digest_algorithm, find_signer_certificate, verify_signer_info};
use crate::verdict::{
    CryptoError, FailureReason, SignerSummary, VerificationReport, VerificationVerdict,
};
use smime_cms::{Decoder, SignedData, SignerInfo};
use smime_mime::{canonicalize, read_smime, SignedMessage, SmimeMessage};
use smime_trust::TrustStore;
use smime_types::Certificate;

/// A verifier for S/MIME signatures
///
/// Holds a trust store and options; build one and share it between threads
/// to verify independent messages concurrently.
#[derive(Debug, Clone)]
pub struct Verifier {
    store: TrustStore,
    options: VerifyOptions,
}

impl Verifier {
    /// Create a verifier with default options
    pub fn new(store: TrustStore) -> Self {
        Self::with_options(store, VerifyOptions::default())
    }

    /// Create a verifier with the given options
    pub fn with_options(store: TrustStore, options: VerifyOptions) -> Self {
        Self { store, options }
    }

    /// The trust store
    pub fn store(&self) -> &TrustStore {
        &self.store
    }

    /// The verification options
    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify a detached signature
    pub fn verify(&self, message: &SignedMessage, envelope: &SignedData) -> VerificationVerdict {
        self.verify_detailed(message, envelope).verdict
    }

    /// Verify a detached signature and report per-signer detail
    ///
    /// For every SignerInfo, in order:
    ///
    /// 1. Find the signer certificate among the candidates.
    /// 2. Tie the signer certificate to the trust store.
    /// 3. Recompute the digest of the canonicalized first part.
    /// 4. Check the message-digest attribute and the signature over the
    ///    signed attributes, or the signature over the content when there
    ///    are no signed attributes.
    ///
    /// The first failing SignerInfo decides the verdict; all of them must
    /// verify for the message to verify.
    pub fn verify_detailed(
        &self,
        message: &SignedMessage,
        envelope: &SignedData,
    ) -> VerificationReport {
        if !envelope.is_detached() {
            return VerificationReport::failed(CryptoError::Unsupported(
                "detached message whose envelope also embeds content".to_string(),
            ));
        }

        let micalg = message.micalg_algorithms();
        if !micalg.is_empty() {
            for info in envelope.signer_infos() {
                if let Some(alg) = info.digest_algorithm().digest_algorithm() {
                    if !micalg.contains(&alg) {
                        tracing::warn!(
                            micalg = message.micalg().unwrap_or_default(),
                            digest = %alg,
                            "micalg does not list the signer's digest algorithm"
                        );
                    }
                }
            }
        }

        let content = message.signed_content(self.options.canonicalization);
        self.verify_content(&content, envelope)
    }

    /// Verify an envelope that carries its content (opaque signing)
    pub fn verify_embedded(&self, envelope: &SignedData) -> VerificationVerdict {
        self.verify_embedded_detailed(envelope).verdict
    }

    /// Verify an envelope that carries its content and report per-signer detail
    pub fn verify_embedded_detailed(&self, envelope: &SignedData) -> VerificationReport {
        let Some(content) = envelope.content() else {
            return VerificationReport::failed(CryptoError::Unsupported(
                "envelope carries no content".to_string(),
            ));
        };
        let content = canonicalize(content, self.options.canonicalization);
        self.verify_content(&content, envelope)
    }

    /// Parse, decode and verify a raw message
    ///
    /// Both `multipart/signed` and opaque `application/pkcs7-mime` messages
    /// are accepted. Framing and decoding problems are errors; everything
    /// after that is reported through the verdict.
    pub fn verify_message(&self, raw: &[u8]) -> Result<VerificationVerdict> {
        let decoder = Decoder::with_limits(self.options.decoder_limits);
        let verdict = match read_smime(raw)? {
            SmimeMessage::Signed(message) => {
                let envelope = decoder.decode(message.envelope())?;
                self.verify(&message, &envelope)
            }
            SmimeMessage::Opaque(message) => {
                let envelope = decoder.decode(message.envelope())?;
                self.verify_embedded(&envelope)
            }
        };
        Ok(verdict)
    }

    /// Signer certificate of every SignerInfo, in envelope order
    ///
    /// Nothing is verified; this only resolves signer identifiers.
    pub fn get_signers(
        &self,
        envelope: &SignedData,
    ) -> std::result::Result<Vec<Certificate>, FailureReason> {
        get_signers(envelope, &self.options)
    }

    fn verify_content(&self, content: &[u8], envelope: &SignedData) -> VerificationReport {
        let candidates = candidates(envelope, &self.options);
        let mut signers = Vec::with_capacity(envelope.signer_infos().len());

        for (index, info) in envelope.signer_infos().iter().enumerate() {
            match self.verify_signer(info, content, envelope, &candidates) {
                Ok(summary) => {
                    tracing::debug!(
                        index,
                        signer = %summary.certificate.subject(),
                        serial = %summary.serial(),
                        "signer verified"
                    );
                    signers.push(summary);
                }
                Err(reason) => {
                    tracing::debug!(index, reason = %reason, "signer failed verification");
                    return VerificationReport {
                        verdict: VerificationVerdict::Failed(reason),
                        signers,
                    };
                }
            }
        }

        VerificationReport {
            verdict: VerificationVerdict::Verified,
            signers,
        }
    }

    fn verify_signer(
        &self,
        info: &SignerInfo,
        content: &[u8],
        envelope: &SignedData,
        candidates: &[&Certificate],
    ) -> std::result::Result<SignerSummary, FailureReason> {
        let certificate = find_signer_certificate(info, candidates)?;

        let trust_path = if self.options.verify_trust {
            Some(evaluate_trust(
                certificate,
                candidates,
                &self.store,
                self.options.verification_time,
            )?)
        } else {
            tracing::warn!(signer = %certificate.subject(), "trust evaluation skipped");
            if let Some(time) = self.options.verification_time {
                check_validity(certificate, time)?;
            }
            None
        };

        verify_signer_info(info, certificate, content, envelope.content_type())?;

        Ok(SignerSummary {
            certificate: certificate.clone(),
            digest_algorithm: digest_algorithm(info)?,
            signing_time: info
                .authenticated_attributes()
                .and_then(|attrs| attrs.signing_time()),
            trust_path,
        })
    }
}

/// Verify a detached signature with default options
pub fn verify(
    message: &SignedMessage,
    envelope: &SignedData,
    store: &TrustStore,
) -> VerificationVerdict {
    Verifier::new(store.clone()).verify(message, envelope)
}

/// Verify a detached signature with the given options and report per-signer detail
pub fn verify_detailed(
    message: &SignedMessage,
    envelope: &SignedData,
    store: &TrustStore,
    options: &VerifyOptions,
) -> VerificationReport {
    Verifier::with_options(store.clone(), options.clone()).verify_detailed(message, envelope)
}

/// Verify an envelope that carries its content, with default options
pub fn verify_embedded(envelope: &SignedData, store: &TrustStore) -> VerificationVerdict {
    Verifier::new(store.clone()).verify_embedded(envelope)
}

/// Parse, decode and verify a raw message with default options
pub fn verify_message(raw: &[u8], store: &TrustStore) -> Result<VerificationVerdict> {
    Verifier::new(store.clone()).verify_message(raw)
}

/// Signer certificate of every SignerInfo, in envelope order
pub fn get_signers(
    envelope: &SignedData,
    options: &VerifyOptions,
) -> std::result::Result<Vec<Certificate>, FailureReason> {
    let candidates = candidates(envelope, options);
    envelope
        .signer_infos()
        .iter()
        .map(|info| {
            find_signer_certificate(info, &candidates)
                .cloned()
                .map_err(FailureReason::from)
        })
        .collect()
}
