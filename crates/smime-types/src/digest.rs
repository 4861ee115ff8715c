//! Digest algorithm identifiers

use crate::error::{Error, Result};
use const_oid::ObjectIdentifier;

/// OID for SHA-256: 2.16.840.1.101.3.4.2.1
pub const OID_SHA256: ObjectIdentifier = const_oid::db::rfc5912::ID_SHA_256;

/// OID for SHA-384: 2.16.840.1.101.3.4.2.2
pub const OID_SHA384: ObjectIdentifier = const_oid::db::rfc5912::ID_SHA_384;

/// OID for SHA-512: 2.16.840.1.101.3.4.2.3
pub const OID_SHA512: ObjectIdentifier = const_oid::db::rfc5912::ID_SHA_512;

/// Digest algorithms accepted for content and attribute hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA2-256
    Sha256,
    /// SHA2-384
    Sha384,
    /// SHA2-512
    Sha512,
}

impl DigestAlgorithm {
    /// Look up a digest algorithm by its OID
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        match *oid {
            OID_SHA256 => Ok(DigestAlgorithm::Sha256),
            OID_SHA384 => Ok(DigestAlgorithm::Sha384),
            OID_SHA512 => Ok(DigestAlgorithm::Sha512),
            _ => Err(Error::UnsupportedDigest(oid.to_string())),
        }
    }

    /// Look up a digest algorithm by its `micalg` name (RFC 5751 section 3.4.3.2)
    ///
    /// Accepts the registered `sha-256` form as well as the `sha256` spelling
    /// some agents emit.
    pub fn from_micalg(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sha-256" | "sha256" => Some(DigestAlgorithm::Sha256),
            "sha-384" | "sha384" => Some(DigestAlgorithm::Sha384),
            "sha-512" | "sha512" => Some(DigestAlgorithm::Sha512),
            _ => None,
        }
    }

    /// Get the OID for this algorithm
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Sha256 => OID_SHA256,
            DigestAlgorithm::Sha384 => OID_SHA384,
            DigestAlgorithm::Sha512 => OID_SHA512,
        }
    }

    /// Get the `micalg` parameter value for this algorithm
    pub fn micalg(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha-256",
            DigestAlgorithm::Sha384 => "sha-384",
            DigestAlgorithm::Sha512 => "sha-512",
        }
    }

    /// Get the digest size in bytes for this algorithm
    pub fn digest_size(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigestAlgorithm::Sha256 => write!(f, "SHA-256"),
            DigestAlgorithm::Sha384 => write!(f, "SHA-384"),
            DigestAlgorithm::Sha512 => write!(f, "SHA-512"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_oid() {
        assert_eq!(
            DigestAlgorithm::from_oid(&OID_SHA384).unwrap(),
            DigestAlgorithm::Sha384
        );

        let sha1 = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
        assert!(matches!(
            DigestAlgorithm::from_oid(&sha1),
            Err(Error::UnsupportedDigest(_))
        ));
    }

    #[test]
    fn test_micalg_names() {
        assert_eq!(
            DigestAlgorithm::from_micalg("sha-256"),
            Some(DigestAlgorithm::Sha256)
        );
        assert_eq!(
            DigestAlgorithm::from_micalg("SHA512"),
            Some(DigestAlgorithm::Sha512)
        );
        assert_eq!(DigestAlgorithm::from_micalg("sha1"), None);

        for alg in [
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            assert_eq!(DigestAlgorithm::from_micalg(alg.micalg()), Some(alg));
        }
    }

    #[test]
    fn test_digest_size() {
        assert_eq!(DigestAlgorithm::Sha256.digest_size(), 32);
        assert_eq!(DigestAlgorithm::Sha384.digest_size(), 48);
        assert_eq!(DigestAlgorithm::Sha512.digest_size(), 64);
    }
}
