//! Verification verdicts and reports

use chrono::{DateTime, Utc};
use smime_types::{Certificate, DigestAlgorithm};
use thiserror::Error;

/// Why a signer could not be found or trusted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// No candidate certificate matches the SignerInfo identifier
    #[error("signer certificate not found for {signer}")]
    SignerCertNotFound {
        /// Rendered signer identifier
        signer: String,
    },

    /// Two different certificates match the SignerInfo identifier
    #[error("more than one certificate matches {signer}")]
    AmbiguousSigner {
        /// Rendered signer identifier
        signer: String,
    },

    /// The signer does not chain to a trust store entry
    #[error("signer \"{subject}\" is not trusted")]
    UntrustedSigner {
        /// Subject of the signer certificate
        subject: String,
    },

    /// A certificate on the trust path expired before the verification time
    #[error("certificate \"{subject}\" expired at {not_after}")]
    CertificateExpired {
        /// Subject of the expired certificate
        subject: String,
        /// End of its validity period
        not_after: DateTime<Utc>,
    },

    /// A certificate on the trust path is not yet valid at the verification time
    #[error("certificate \"{subject}\" is not valid before {not_before}")]
    CertificateNotYetValid {
        /// Subject of the certificate
        subject: String,
        /// Start of its validity period
        not_before: DateTime<Utc>,
    },
}

/// Why the digest or signature checks failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The message-digest attribute differs from the recomputed content digest
    #[error("{algorithm} digest of the content does not match the signed digest")]
    DigestMismatch {
        /// Algorithm used for the comparison
        algorithm: DigestAlgorithm,
    },

    /// Signed attributes are present but carry no message digest
    #[error("signed attributes lack a message-digest attribute")]
    MissingMessageDigest,

    /// The content-type attribute differs from the encapsulated content type
    #[error("signed content type {signed} does not match encapsulated content type {encapsulated}")]
    ContentTypeMismatch {
        /// Value of the content-type attribute
        signed: String,
        /// Encapsulated content type of the envelope
        encapsulated: String,
    },

    /// The signature value does not verify under the signer's key
    #[error("signature by \"{subject}\" is invalid")]
    BadSignature {
        /// Subject of the signer certificate
        subject: String,
    },

    /// Algorithm, key or message shape outside what this verifier handles
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Machine-readable reason for a failed verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Signer lookup or trust evaluation failed
    #[error(transparent)]
    Trust(#[from] TrustError),

    /// Digest or signature verification failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl FailureReason {
    /// Whether the failure means the signer is unknown or untrusted
    pub fn is_trust_failure(&self) -> bool {
        matches!(self, FailureReason::Trust(_))
    }
}

/// Outcome of verifying a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationVerdict {
    /// Every SignerInfo verified and chains to the trust store
    Verified,
    /// Verification failed for the given reason
    Failed(FailureReason),
}

impl VerificationVerdict {
    /// Whether the message verified
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationVerdict::Verified)
    }

    /// The failure reason, if any
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            VerificationVerdict::Verified => None,
            VerificationVerdict::Failed(reason) => Some(reason),
        }
    }

    /// Convert into a `Result`
    pub fn into_result(self) -> std::result::Result<(), FailureReason> {
        match self {
            VerificationVerdict::Verified => Ok(()),
            VerificationVerdict::Failed(reason) => Err(reason),
        }
    }
}

impl From<FailureReason> for VerificationVerdict {
    fn from(reason: FailureReason) -> Self {
        VerificationVerdict::Failed(reason)
    }
}

impl From<TrustError> for VerificationVerdict {
    fn from(e: TrustError) -> Self {
        VerificationVerdict::Failed(e.into())
    }
}

impl From<CryptoError> for VerificationVerdict {
    fn from(e: CryptoError) -> Self {
        VerificationVerdict::Failed(e.into())
    }
}

impl std::fmt::Display for VerificationVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationVerdict::Verified => f.write_str("verified"),
            VerificationVerdict::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// How a signer certificate was tied to the trust store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustPath {
    /// The signer certificate is itself a store entry
    Direct,
    /// A store entry issued the signer certificate
    Anchor {
        /// The store entry
        anchor: Certificate,
    },
    /// An intermediate issued the signer certificate
    Intermediate {
        /// The intermediate certificate
        intermediate: Certificate,
        /// Store entry that issued the intermediate
        anchor: Certificate,
    },
}

impl TrustPath {
    /// Certificates on the path above the signer, nearest first
    pub fn issuers(&self) -> Vec<&Certificate> {
        match self {
            TrustPath::Direct => Vec::new(),
            TrustPath::Anchor { anchor } => vec![anchor],
            TrustPath::Intermediate {
                intermediate,
                anchor,
            } => vec![intermediate, anchor],
        }
    }
}

/// What was established about one verified SignerInfo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSummary {
    /// The signer certificate
    pub certificate: Certificate,
    /// Digest algorithm of the SignerInfo
    pub digest_algorithm: DigestAlgorithm,
    /// Value of the signing-time attribute, if signed
    pub signing_time: Option<DateTime<Utc>>,
    /// Trust path, `None` when trust evaluation was skipped
    pub trust_path: Option<TrustPath>,
}

impl SignerSummary {
    /// Subject of the signer certificate
    pub fn subject(&self) -> String {
        self.certificate.subject().to_string()
    }

    /// Serial number of the signer certificate in hex
    pub fn serial(&self) -> String {
        self.certificate.serial_hex()
    }
}

/// Verdict plus per-signer detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Overall verdict
    pub verdict: VerificationVerdict,
    /// One entry per SignerInfo that verified, in envelope order
    pub signers: Vec<SignerSummary>,
}

impl VerificationReport {
    pub(crate) fn failed(reason: impl Into<FailureReason>) -> Self {
        Self {
            verdict: VerificationVerdict::Failed(reason.into()),
            signers: Vec::new(),
        }
    }

    /// Whether the message verified
    pub fn is_verified(&self) -> bool {
        self.verdict.is_verified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_errors() {
        let verdict: VerificationVerdict = CryptoError::MissingMessageDigest.into();
        assert!(!verdict.is_verified());
        assert_eq!(
            verdict.failure(),
            Some(&FailureReason::Crypto(CryptoError::MissingMessageDigest))
        );

        let verdict: VerificationVerdict = TrustError::UntrustedSigner {
            subject: "CN=x".to_string(),
        }
        .into();
        assert!(verdict.failure().unwrap().is_trust_failure());
        assert_eq!(verdict.to_string(), "failed: signer \"CN=x\" is not trusted");
    }

    #[test]
    fn test_into_result() {
        assert!(VerificationVerdict::Verified.into_result().is_ok());
        let reason = FailureReason::Crypto(CryptoError::Unsupported("x".to_string()));
        assert_eq!(
            VerificationVerdict::Failed(reason.clone()).into_result(),
            Err(reason)
        );
    }
}
