//! Owned X.509 certificate handle
//!
//! Certificates arrive either from the trust store host or embedded in a
//! SignedData envelope. Both paths keep the exact DER bytes next to the
//! decoded structure so that equality checks and signature checks work on
//! what was actually transmitted.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use x509_cert::der::{Decode, Encode, Header, Reader, SliceReader};
use x509_cert::ext::pkix::SubjectKeyIdentifier;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::Time;

/// A decoded certificate together with its DER encoding
#[derive(Debug, Clone)]
pub struct Certificate {
    cert: x509_cert::Certificate,
    der: Vec<u8>,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    subject_key_id: Option<Vec<u8>>,
}

impl Certificate {
    /// Parse a certificate from DER bytes
    ///
    /// Trailing bytes after the certificate are rejected.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = x509_cert::Certificate::from_der(der)
            .map_err(|e| Error::InvalidCertificate(format!("failed to parse certificate: {}", e)))?;
        Self::build(cert, der.to_vec())
    }

    /// Wrap an already decoded certificate, re-encoding it to DER
    pub fn from_x509(cert: x509_cert::Certificate) -> Result<Self> {
        let der = cert.to_der().map_err(|e| {
            Error::InvalidCertificate(format!("failed to encode certificate: {}", e))
        })?;
        Self::build(cert, der)
    }

    fn build(cert: x509_cert::Certificate, der: Vec<u8>) -> Result<Self> {
        let validity = &cert.tbs_certificate.validity;
        let not_before = to_datetime(&validity.not_before)?;
        let not_after = to_datetime(&validity.not_after)?;

        // A malformed SKI extension only disables SKI-based signer lookup
        let subject_key_id = cert
            .tbs_certificate
            .get::<SubjectKeyIdentifier>()
            .ok()
            .flatten()
            .map(|(_critical, ski)| ski.0.as_bytes().to_vec());

        Ok(Self {
            cert,
            der,
            not_before,
            not_after,
            subject_key_id,
        })
    }

    /// Subject distinguished name
    pub fn subject(&self) -> &Name {
        &self.cert.tbs_certificate.subject
    }

    /// Issuer distinguished name
    pub fn issuer(&self) -> &Name {
        &self.cert.tbs_certificate.issuer
    }

    /// Serial number as encoded in the certificate
    pub fn serial_number(&self) -> &SerialNumber {
        &self.cert.tbs_certificate.serial_number
    }

    /// Serial number rendered as lowercase hex, for logs and reports
    pub fn serial_hex(&self) -> String {
        hex::encode(self.serial_number().as_bytes())
    }

    /// SubjectPublicKeyInfo of the certificate
    pub fn public_key(&self) -> &SubjectPublicKeyInfoOwned {
        &self.cert.tbs_certificate.subject_public_key_info
    }

    /// Raw subjectPublicKey bits (EC point, PKCS#1 RSA key or Ed25519 key)
    ///
    /// Returns `None` if the BIT STRING has unused bits.
    pub fn public_key_bytes(&self) -> Option<&[u8]> {
        self.public_key().subject_public_key.as_bytes()
    }

    /// Algorithm the issuer used to sign this certificate
    pub fn signature_algorithm(&self) -> &AlgorithmIdentifierOwned {
        &self.cert.signature_algorithm
    }

    /// Issuer signature over the TBSCertificate
    pub fn signature(&self) -> Option<&[u8]> {
        self.cert.signature.as_bytes()
    }

    /// Subject key identifier extension value, if present and well formed
    pub fn subject_key_identifier(&self) -> Option<&[u8]> {
        self.subject_key_id.as_deref()
    }

    /// Start of the validity period
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity period
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Whether `time` falls inside the validity period (inclusive)
    pub fn is_valid_at(&self, time: DateTime<Utc>) -> bool {
        self.not_before <= time && time <= self.not_after
    }

    /// Whether subject and issuer names are identical
    pub fn is_self_issued(&self) -> bool {
        self.subject() == self.issuer()
    }

    /// Whether both certificates carry the same SubjectPublicKeyInfo
    pub fn same_public_key(&self, other: &Certificate) -> bool {
        self.public_key() == other.public_key()
    }

    /// The exact TBSCertificate bytes covered by the issuer signature
    pub fn tbs_bytes(&self) -> Result<&[u8]> {
        let malformed =
            |e: x509_cert::der::Error| Error::InvalidCertificate(format!("bad TBS framing: {}", e));

        let mut reader = SliceReader::new(&self.der).map_err(malformed)?;
        Header::decode(&mut reader).map_err(malformed)?;
        let start = usize::try_from(reader.position()).map_err(malformed)?;
        let tbs = Header::decode(&mut reader).map_err(malformed)?;
        let value_start = usize::try_from(reader.position()).map_err(malformed)?;
        let value_len = usize::try_from(tbs.length).map_err(malformed)?;

        value_start
            .checked_add(value_len)
            .and_then(|end| self.der.get(start..end))
            .ok_or_else(|| Error::InvalidCertificate("TBSCertificate overruns certificate".into()))
    }

    /// The DER encoding this certificate was built from
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// The decoded `x509_cert` structure
    pub fn as_x509(&self) -> &x509_cert::Certificate {
        &self.cert
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl std::hash::Hash for Certificate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

impl std::fmt::Display for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.subject())
    }
}

fn to_datetime(time: &Time) -> Result<DateTime<Utc>> {
    let since_epoch = time.to_unix_duration();
    let secs = i64::try_from(since_epoch.as_secs())
        .map_err(|_| Error::InvalidCertificate("validity time out of range".to_string()))?;
    DateTime::from_timestamp(secs, since_epoch.subsec_nanos())
        .ok_or_else(|| Error::InvalidCertificate("validity time out of range".to_string()))
}
