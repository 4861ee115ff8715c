//! Verification options

use chrono::{DateTime, Utc};
use smime_cms::DecoderLimits;
use smime_mime::Canonicalization;
use smime_types::Certificate;

/// Options controlling how a message is verified
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// How the signed content is canonicalized before digesting
    pub canonicalization: Canonicalization,
    /// If set, every certificate on the trust path must be valid at this time
    pub verification_time: Option<DateTime<Utc>>,
    /// Look up signer and intermediate certificates in the envelope
    pub use_embedded_certificates: bool,
    /// Certificates supplied out of band, searched after the embedded ones
    pub extra_certificates: Vec<Certificate>,
    /// Evaluate trust against the store
    pub verify_trust: bool,
    /// Limits applied when decoding the envelope
    pub decoder_limits: DecoderLimits,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            canonicalization: Canonicalization::Exact,
            verification_time: None,
            use_embedded_certificates: true,
            extra_certificates: Vec::new(),
            verify_trust: true,
            decoder_limits: DecoderLimits::default(),
        }
    }
}

impl VerifyOptions {
    /// Create the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canonicalization mode
    pub fn with_canonicalization(mut self, mode: Canonicalization) -> Self {
        self.canonicalization = mode;
        self
    }

    /// Check certificate validity at `time`
    pub fn at_time(mut self, time: DateTime<Utc>) -> Self {
        self.verification_time = Some(time);
        self
    }

    /// Check certificate validity at the current time
    pub fn at_current_time(self) -> Self {
        self.at_time(Utc::now())
    }

    /// Ignore certificates carried in the envelope
    pub fn without_embedded_certificates(mut self) -> Self {
        self.use_embedded_certificates = false;
        self
    }

    /// Add an out-of-band certificate for signer and intermediate lookup
    pub fn with_extra_certificate(mut self, cert: Certificate) -> Self {
        self.extra_certificates.push(cert);
        self
    }

    /// Add several out-of-band certificates
    pub fn with_extra_certificates(mut self, certs: impl IntoIterator<Item = Certificate>) -> Self {
        self.extra_certificates.extend(certs);
        self
    }

    /// Skip trust evaluation
    ///
    /// WARNING: the signature is then only checked against whatever
    /// certificate the message itself supplies. Only use this to inspect
    /// messages, never to accept them.
    pub fn skip_trust(mut self) -> Self {
        self.verify_trust = false;
        self
    }

    /// Set the envelope decoding limits
    pub fn with_decoder_limits(mut self, limits: DecoderLimits) -> Self {
        self.decoder_limits = limits;
        self
    }
}
