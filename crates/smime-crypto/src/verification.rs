//! Signature verification using aws-lc-rs

use crate::error::{Error, Result};
use crate::scheme::SigningScheme;
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1, ECDSA_P256_SHA384_ASN1,
    ECDSA_P384_SHA256_ASN1, ECDSA_P384_SHA384_ASN1, ECDSA_P521_SHA512_ASN1, ED25519,
    RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
};
use smime_types::Certificate;

/// A public key for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey {
    /// Raw public key bytes (EC point, PKCS#1 RSAPublicKey or Ed25519 key)
    pub bytes: Vec<u8>,
    /// The scheme to use for verification
    pub scheme: SigningScheme,
}

impl VerificationKey {
    /// Create a new verification key
    pub fn new(bytes: Vec<u8>, scheme: SigningScheme) -> Self {
        Self { bytes, scheme }
    }

    /// Build a key from a certificate's subjectPublicKey
    pub fn from_certificate(cert: &Certificate, scheme: SigningScheme) -> Result<Self> {
        let bytes = cert.public_key_bytes().ok_or_else(|| {
            Error::InvalidKey(format!(
                "public key of \"{}\" has unused bits",
                cert.subject()
            ))
        })?;
        Ok(Self::new(bytes.to_vec(), scheme))
    }

    /// Verify a signature over data
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let (algorithm, what): (&'static dyn VerificationAlgorithm, &str) = match self.scheme {
            SigningScheme::EcdsaP256Sha256 => (&ECDSA_P256_SHA256_ASN1, "ECDSA P-256 SHA-256"),
            SigningScheme::EcdsaP256Sha384 => (&ECDSA_P256_SHA384_ASN1, "ECDSA P-256 SHA-384"),
            SigningScheme::EcdsaP384Sha256 => (&ECDSA_P384_SHA256_ASN1, "ECDSA P-384 SHA-256"),
            SigningScheme::EcdsaP384Sha384 => (&ECDSA_P384_SHA384_ASN1, "ECDSA P-384 SHA-384"),
            SigningScheme::EcdsaP521Sha512 => (&ECDSA_P521_SHA512_ASN1, "ECDSA P-521 SHA-512"),
            SigningScheme::RsaPkcs1Sha256 => (&RSA_PKCS1_2048_8192_SHA256, "RSA PKCS#1 SHA-256"),
            SigningScheme::RsaPkcs1Sha384 => (&RSA_PKCS1_2048_8192_SHA384, "RSA PKCS#1 SHA-384"),
            SigningScheme::RsaPkcs1Sha512 => (&RSA_PKCS1_2048_8192_SHA512, "RSA PKCS#1 SHA-512"),
            SigningScheme::Ed25519 => (&ED25519, "Ed25519"),
        };

        UnparsedPublicKey::new(algorithm, &self.bytes)
            .verify(data, signature)
            .map_err(|_| Error::Verification(format!("{} signature invalid", what)))
    }
}

/// Verify a signature using the specified scheme
pub fn verify_signature(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
    scheme: SigningScheme,
) -> Result<()> {
    let key = VerificationKey::new(public_key.to_vec(), scheme);
    key.verify(data, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{
        EcdsaKeyPair, Ed25519KeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
        ECDSA_P384_SHA384_ASN1_SIGNING,
    };

    fn ecdsa_signed(
        signing: &'static aws_lc_rs::signature::EcdsaSigningAlgorithm,
        data: &[u8],
    ) -> (Vec<u8>, Vec<u8>) {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(signing, &rng).unwrap();
        let kp = EcdsaKeyPair::from_pkcs8(signing, pkcs8.as_ref()).unwrap();
        let sig = kp.sign(&rng, data).unwrap();
        (kp.public_key().as_ref().to_vec(), sig.as_ref().to_vec())
    }

    fn ed25519_signed(data: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
        let kp = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
        let sig = kp.sign(data);
        (kp.public_key().as_ref().to_vec(), sig.as_ref().to_vec())
    }

    #[test]
    fn test_verify_ecdsa_p256() {
        let data = b"test data";
        let (public_key, sig) = ecdsa_signed(&ECDSA_P256_SHA256_ASN1_SIGNING, data);

        let vk = VerificationKey::new(public_key, SigningScheme::EcdsaP256Sha256);
        assert!(vk.verify(data, &sig).is_ok());
    }

    #[test]
    fn test_verify_ecdsa_p384() {
        let data = b"test data";
        let (public_key, sig) = ecdsa_signed(&ECDSA_P384_SHA384_ASN1_SIGNING, data);

        assert!(verify_signature(&public_key, data, &sig, SigningScheme::EcdsaP384Sha384).is_ok());
        // Same key, wrong hash
        assert!(verify_signature(&public_key, data, &sig, SigningScheme::EcdsaP384Sha256).is_err());
    }

    #[test]
    fn test_verify_ed25519() {
        let data = b"test data";
        let (public_key, sig) = ed25519_signed(data);

        let vk = VerificationKey::new(public_key, SigningScheme::Ed25519);
        assert!(vk.verify(data, &sig).is_ok());
    }

    #[test]
    fn test_verify_bad_signature() {
        let (public_key, _) = ed25519_signed(b"test data");

        let vk = VerificationKey::new(public_key, SigningScheme::Ed25519);
        let err = vk.verify(b"test data", &[0u8; 64]).unwrap_err();
        assert!(matches!(err, Error::Verification(_)));
    }

    #[test]
    fn test_verify_wrong_data() {
        let data = b"test data";
        let (public_key, sig) = ecdsa_signed(&ECDSA_P256_SHA256_ASN1_SIGNING, data);

        let vk = VerificationKey::new(public_key, SigningScheme::EcdsaP256Sha256);
        assert!(vk.verify(b"wrong data", &sig).is_err());
    }

    #[test]
    fn test_verify_wrong_key_type() {
        let data = b"test data";
        let (public_key, sig) = ed25519_signed(data);

        let vk = VerificationKey::new(public_key, SigningScheme::EcdsaP256Sha256);
        assert!(vk.verify(data, &sig).is_err());
    }
}
