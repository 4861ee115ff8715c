//! Signature scheme resolution
//!
//! CMS and X.509 name the signature algorithm and the key separately: a
//! SignerInfo may say `rsaEncryption` and leave the hash to its digest
//! algorithm field, or say `ecdsa-with-SHA384` and fix the hash itself. The
//! curve of an EC key comes from the key's parameters. This module turns
//! that triple into one concrete verification scheme.

use crate::error::{Error, Result};
use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ECDSA_WITH_SHA_512, ID_EC_PUBLIC_KEY,
    ID_RSASSA_PSS, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1, SECP_521_R_1,
    SHA_256_WITH_RSA_ENCRYPTION, SHA_384_WITH_RSA_ENCRYPTION, SHA_512_WITH_RSA_ENCRYPTION,
};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;
use smime_types::DigestAlgorithm;
use spki::SubjectPublicKeyInfoOwned;

/// Supported signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningScheme {
    /// ECDSA P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA P-256 with SHA-384
    EcdsaP256Sha384,
    /// ECDSA P-384 with SHA-256
    EcdsaP384Sha256,
    /// ECDSA P-384 with SHA-384
    EcdsaP384Sha384,
    /// ECDSA P-521 with SHA-512
    EcdsaP521Sha512,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
    /// Ed25519 (pure)
    Ed25519,
}

impl SigningScheme {
    /// Get the name of this scheme
    pub fn name(&self) -> &'static str {
        match self {
            SigningScheme::EcdsaP256Sha256 => "ECDSA_P256_SHA256",
            SigningScheme::EcdsaP256Sha384 => "ECDSA_P256_SHA384",
            SigningScheme::EcdsaP384Sha256 => "ECDSA_P384_SHA256",
            SigningScheme::EcdsaP384Sha384 => "ECDSA_P384_SHA384",
            SigningScheme::EcdsaP521Sha512 => "ECDSA_P521_SHA512",
            SigningScheme::RsaPkcs1Sha256 => "RSA_PKCS1_SHA256",
            SigningScheme::RsaPkcs1Sha384 => "RSA_PKCS1_SHA384",
            SigningScheme::RsaPkcs1Sha512 => "RSA_PKCS1_SHA512",
            SigningScheme::Ed25519 => "ED25519",
        }
    }

    /// Hash applied to the signed bytes, `None` for Ed25519
    pub fn digest_algorithm(&self) -> Option<DigestAlgorithm> {
        match self {
            SigningScheme::EcdsaP256Sha256
            | SigningScheme::EcdsaP384Sha256
            | SigningScheme::RsaPkcs1Sha256 => Some(DigestAlgorithm::Sha256),
            SigningScheme::EcdsaP256Sha384
            | SigningScheme::EcdsaP384Sha384
            | SigningScheme::RsaPkcs1Sha384 => Some(DigestAlgorithm::Sha384),
            SigningScheme::EcdsaP521Sha512 | SigningScheme::RsaPkcs1Sha512 => {
                Some(DigestAlgorithm::Sha512)
            }
            SigningScheme::Ed25519 => None,
        }
    }

    /// Resolve the scheme for a signature algorithm OID, an optional
    /// separately declared digest, and the verifying key.
    ///
    /// `digest` is the SignerInfo digest algorithm for CMS signatures and
    /// `None` for certificate signatures, whose OID always fixes the hash.
    pub fn resolve(
        signature_algorithm: &ObjectIdentifier,
        digest: Option<DigestAlgorithm>,
        key: &SubjectPublicKeyInfoOwned,
    ) -> Result<Self> {
        let key_algorithm = key.algorithm.oid;

        if key_algorithm == ID_ED_25519 {
            if *signature_algorithm != ID_ED_25519 {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "signature algorithm {} with an Ed25519 key",
                    signature_algorithm
                )));
            }
            return Ok(SigningScheme::Ed25519);
        }

        let (implied, family_matches) = match *signature_algorithm {
            ECDSA_WITH_SHA_256 => (
                Some(DigestAlgorithm::Sha256),
                key_algorithm == ID_EC_PUBLIC_KEY,
            ),
            ECDSA_WITH_SHA_384 => (
                Some(DigestAlgorithm::Sha384),
                key_algorithm == ID_EC_PUBLIC_KEY,
            ),
            ECDSA_WITH_SHA_512 => (
                Some(DigestAlgorithm::Sha512),
                key_algorithm == ID_EC_PUBLIC_KEY,
            ),
            // Some signers put the key algorithm here and rely on the digest field
            ID_EC_PUBLIC_KEY => (None, key_algorithm == ID_EC_PUBLIC_KEY),
            SHA_256_WITH_RSA_ENCRYPTION => (
                Some(DigestAlgorithm::Sha256),
                key_algorithm == RSA_ENCRYPTION,
            ),
            SHA_384_WITH_RSA_ENCRYPTION => (
                Some(DigestAlgorithm::Sha384),
                key_algorithm == RSA_ENCRYPTION,
            ),
            SHA_512_WITH_RSA_ENCRYPTION => (
                Some(DigestAlgorithm::Sha512),
                key_algorithm == RSA_ENCRYPTION,
            ),
            RSA_ENCRYPTION => (None, key_algorithm == RSA_ENCRYPTION),
            ID_RSASSA_PSS => {
                return Err(Error::UnsupportedAlgorithm("RSASSA-PSS".to_string()));
            }
            _ => {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "signature algorithm {}",
                    signature_algorithm
                )));
            }
        };

        if !family_matches {
            return Err(Error::UnsupportedAlgorithm(format!(
                "signature algorithm {} does not match key algorithm {}",
                signature_algorithm, key_algorithm
            )));
        }

        let hash = match (implied, digest) {
            (Some(implied), Some(declared)) if implied != declared => {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "signature algorithm {} implies {} but digest algorithm is {}",
                    signature_algorithm, implied, declared
                )));
            }
            (Some(hash), _) | (None, Some(hash)) => hash,
            (None, None) => {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "signature algorithm {} does not name a hash",
                    signature_algorithm
                )));
            }
        };

        if key_algorithm == RSA_ENCRYPTION {
            return Ok(match hash {
                DigestAlgorithm::Sha256 => SigningScheme::RsaPkcs1Sha256,
                DigestAlgorithm::Sha384 => SigningScheme::RsaPkcs1Sha384,
                DigestAlgorithm::Sha512 => SigningScheme::RsaPkcs1Sha512,
            });
        }

        let curve = ec_curve(key)?;
        match (curve, hash) {
            (SECP_256_R_1, DigestAlgorithm::Sha256) => Ok(SigningScheme::EcdsaP256Sha256),
            (SECP_256_R_1, DigestAlgorithm::Sha384) => Ok(SigningScheme::EcdsaP256Sha384),
            (SECP_384_R_1, DigestAlgorithm::Sha256) => Ok(SigningScheme::EcdsaP384Sha256),
            (SECP_384_R_1, DigestAlgorithm::Sha384) => Ok(SigningScheme::EcdsaP384Sha384),
            (SECP_521_R_1, DigestAlgorithm::Sha512) => Ok(SigningScheme::EcdsaP521Sha512),
            _ => Err(Error::UnsupportedAlgorithm(format!(
                "unsupported curve/digest combination: {} / {}",
                curve, hash
            ))),
        }
    }
}

impl std::fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Named curve of an EC public key
fn ec_curve(key: &SubjectPublicKeyInfoOwned) -> Result<ObjectIdentifier> {
    let params = key
        .algorithm
        .parameters
        .as_ref()
        .ok_or_else(|| Error::InvalidKey("missing EC curve parameters".to_string()))?;
    params
        .decode_as::<ObjectIdentifier>()
        .map_err(|e| Error::InvalidKey(format!("failed to decode curve OID: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smime_types::Certificate;

    const P256_CERT: &[u8] = include_bytes!("../../smime-verify/test_data/certs/carol.der");
    const RSA_CERT: &[u8] = include_bytes!("../../smime-verify/test_data/certs/dave.der");
    const P384_CERT: &[u8] = include_bytes!("../../smime-verify/test_data/certs/erin.der");
    const ED25519_CERT: &[u8] = include_bytes!("../../smime-verify/test_data/certs/frank.der");

    fn key(der: &[u8]) -> SubjectPublicKeyInfoOwned {
        Certificate::from_der(der).unwrap().public_key().clone()
    }

    #[test]
    fn test_ecdsa_schemes() {
        let p256 = key(P256_CERT);
        let p384 = key(P384_CERT);

        assert_eq!(
            SigningScheme::resolve(&ECDSA_WITH_SHA_256, Some(DigestAlgorithm::Sha256), &p256)
                .unwrap(),
            SigningScheme::EcdsaP256Sha256
        );
        assert_eq!(
            SigningScheme::resolve(&ECDSA_WITH_SHA_256, Some(DigestAlgorithm::Sha256), &p384)
                .unwrap(),
            SigningScheme::EcdsaP384Sha256
        );
        assert_eq!(
            SigningScheme::resolve(&ID_EC_PUBLIC_KEY, Some(DigestAlgorithm::Sha384), &p384)
                .unwrap(),
            SigningScheme::EcdsaP384Sha384
        );
        assert!(matches!(
            SigningScheme::resolve(&ECDSA_WITH_SHA_512, None, &p256),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_rsa_schemes() {
        let rsa = key(RSA_CERT);

        assert_eq!(
            SigningScheme::resolve(&RSA_ENCRYPTION, Some(DigestAlgorithm::Sha512), &rsa).unwrap(),
            SigningScheme::RsaPkcs1Sha512
        );
        assert_eq!(
            SigningScheme::resolve(&SHA_256_WITH_RSA_ENCRYPTION, None, &rsa).unwrap(),
            SigningScheme::RsaPkcs1Sha256
        );
        assert!(matches!(
            SigningScheme::resolve(&RSA_ENCRYPTION, None, &rsa),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            SigningScheme::resolve(&ID_RSASSA_PSS, Some(DigestAlgorithm::Sha256), &rsa),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_hash_disagreement_is_unsupported() {
        let rsa = key(RSA_CERT);
        assert!(matches!(
            SigningScheme::resolve(
                &SHA_384_WITH_RSA_ENCRYPTION,
                Some(DigestAlgorithm::Sha256),
                &rsa
            ),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_key_family_mismatch() {
        let p256 = key(P256_CERT);
        assert!(matches!(
            SigningScheme::resolve(&SHA_256_WITH_RSA_ENCRYPTION, None, &p256),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_ed25519() {
        let ed = key(ED25519_CERT);
        let scheme =
            SigningScheme::resolve(&ID_ED_25519, Some(DigestAlgorithm::Sha512), &ed).unwrap();
        assert_eq!(scheme, SigningScheme::Ed25519);
        assert_eq!(scheme.digest_algorithm(), None);
        assert!(SigningScheme::resolve(&ECDSA_WITH_SHA_256, None, &ed).is_err());
    }
}
