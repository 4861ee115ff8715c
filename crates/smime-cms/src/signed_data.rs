//! Decoded SignedData model
//!
//! These are immutable value objects produced by [`crate::Decoder`]. They
//! own their data so that a decoded envelope can outlive the input buffer.

use chrono::{DateTime, Utc};
use const_oid::ObjectIdentifier;
use smime_types::{Certificate, DigestAlgorithm};
use x509_cert::attr::Attribute;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;

/// OID for id-signedData: 1.2.840.113549.1.7.2
pub const OID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

/// OID for id-data: 1.2.840.113549.1.7.1
pub const OID_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");

/// OID for the content-type attribute: 1.2.840.113549.1.9.3
pub const OID_CONTENT_TYPE: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.3");

/// OID for the message-digest attribute: 1.2.840.113549.1.9.4
pub const OID_MESSAGE_DIGEST: ObjectIdentifier = const_oid::db::rfc6268::ID_MESSAGE_DIGEST;

/// OID for the signing-time attribute: 1.2.840.113549.1.9.5
pub const OID_SIGNING_TIME: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.5");

/// An algorithm identifier: OID plus DER-encoded parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlgorithmId {
    /// Algorithm OID
    pub oid: ObjectIdentifier,
    /// DER encoding of the parameters, if present
    pub parameters: Option<Vec<u8>>,
}

impl AlgorithmId {
    /// Create an identifier without parameters
    pub fn new(oid: ObjectIdentifier) -> Self {
        Self {
            oid,
            parameters: None,
        }
    }

    /// The digest algorithm this identifier names, if it is one we support
    pub fn digest_algorithm(&self) -> Option<DigestAlgorithm> {
        DigestAlgorithm::from_oid(&self.oid).ok()
    }

    pub(crate) fn from_x509(alg: &AlgorithmIdentifierOwned) -> der::Result<Self> {
        use der::Encode;

        let parameters = alg.parameters.as_ref().map(|p| p.to_der()).transpose()?;
        Ok(Self {
            oid: alg.oid,
            parameters,
        })
    }
}

impl std::fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.oid)
    }
}

/// How a SignerInfo names its certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerId {
    /// Issuer distinguished name and certificate serial number
    IssuerAndSerial {
        /// Issuer of the signer certificate
        issuer: Name,
        /// Serial number of the signer certificate
        serial: SerialNumber,
    },
    /// Subject key identifier extension value
    SubjectKeyId(Vec<u8>),
}

impl SignerId {
    /// Whether `cert` is the certificate this identifier names
    pub fn matches(&self, cert: &Certificate) -> bool {
        match self {
            SignerId::IssuerAndSerial { issuer, serial } => {
                cert.issuer() == issuer && cert.serial_number() == serial
            }
            SignerId::SubjectKeyId(ski) => cert.subject_key_identifier() == Some(ski.as_slice()),
        }
    }
}

impl std::fmt::Display for SignerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignerId::IssuerAndSerial { issuer, serial } => {
                write!(f, "issuer \"{}\" serial {}", issuer, hex::encode(serial.as_bytes()))
            }
            SignerId::SubjectKeyId(ski) => write!(f, "subject key id {}", hex::encode(ski)),
        }
    }
}

/// The signed attribute set of a SignerInfo
///
/// Besides the raw attributes this keeps the well-known values extracted at
/// decode time, and the canonical `SET OF` encoding that the signature
/// actually covers (RFC 5652 section 5.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAttributes {
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) encoded: Vec<u8>,
    pub(crate) content_type: Option<ObjectIdentifier>,
    pub(crate) message_digest: Option<Vec<u8>>,
    pub(crate) signing_time: Option<DateTime<Utc>>,
}

impl AuthenticatedAttributes {
    /// Value of the message-digest attribute
    pub fn message_digest(&self) -> Option<&[u8]> {
        self.message_digest.as_deref()
    }

    /// Value of the content-type attribute
    pub fn content_type(&self) -> Option<&ObjectIdentifier> {
        self.content_type.as_ref()
    }

    /// Value of the signing-time attribute
    pub fn signing_time(&self) -> Option<DateTime<Utc>> {
        self.signing_time
    }

    /// DER encoding of the attributes as a `SET OF`, i.e. the bytes the
    /// signature is computed over
    pub fn signed_bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// Attribute with the given type
    pub fn get(&self, oid: &ObjectIdentifier) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &a.oid == oid)
    }

    /// Iterate over all attributes in encoding order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Per-signer information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerInfo {
    pub(crate) version: u8,
    pub(crate) sid: SignerId,
    pub(crate) digest_algorithm: AlgorithmId,
    pub(crate) signature_algorithm: AlgorithmId,
    pub(crate) authenticated_attributes: Option<AuthenticatedAttributes>,
    pub(crate) signature: Vec<u8>,
}

impl SignerInfo {
    /// SignerInfo syntax version (1 for issuer/serial, 3 for key id)
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Identifier of the signer certificate
    pub fn signer_id(&self) -> &SignerId {
        &self.sid
    }

    /// Digest algorithm applied to the content
    pub fn digest_algorithm(&self) -> &AlgorithmId {
        &self.digest_algorithm
    }

    /// Signature algorithm
    pub fn signature_algorithm(&self) -> &AlgorithmId {
        &self.signature_algorithm
    }

    /// Signed attributes, if present
    pub fn authenticated_attributes(&self) -> Option<&AuthenticatedAttributes> {
        self.authenticated_attributes.as_ref()
    }

    /// Signature value
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// A decoded SignedData envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedData {
    pub(crate) version: u32,
    pub(crate) digest_algorithms: Vec<AlgorithmId>,
    pub(crate) content_type: ObjectIdentifier,
    pub(crate) content: Option<Vec<u8>>,
    pub(crate) certificates: Vec<Certificate>,
    pub(crate) crl_count: usize,
    pub(crate) signer_infos: Vec<SignerInfo>,
}

impl SignedData {
    /// SignedData syntax version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Digest algorithms declared at the SignedData level
    pub fn digest_algorithms(&self) -> &[AlgorithmId] {
        &self.digest_algorithms
    }

    /// Encapsulated content type (normally id-data)
    pub fn content_type(&self) -> &ObjectIdentifier {
        &self.content_type
    }

    /// Embedded content, absent for detached signatures
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// Whether the content travels outside the envelope
    pub fn is_detached(&self) -> bool {
        self.content.is_none()
    }

    /// Embedded X.509 certificates in envelope order
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Number of embedded revocation lists (not interpreted)
    pub fn crl_count(&self) -> usize {
        self.crl_count
    }

    /// Signer infos in envelope order; never empty
    pub fn signer_infos(&self) -> &[SignerInfo] {
        &self.signer_infos
    }

    /// Embedded certificates matching a signer identifier
    pub fn certificates_for<'a>(
        &'a self,
        sid: &'a SignerId,
    ) -> impl Iterator<Item = &'a Certificate> + 'a {
        self.certificates.iter().filter(move |c| sid.matches(c))
    }
}
