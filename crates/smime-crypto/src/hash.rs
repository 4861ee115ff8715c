//! Content digests using aws-lc-rs

use aws_lc_rs::digest::{self, SHA256, SHA384, SHA512};
use smime_types::DigestAlgorithm;

/// Hash `data` with the given algorithm
pub fn digest(algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    let alg = match algorithm {
        DigestAlgorithm::Sha256 => &SHA256,
        DigestAlgorithm::Sha384 => &SHA384,
        DigestAlgorithm::Sha512 => &SHA512,
    };
    digest::digest(alg, data).as_ref().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = digest(DigestAlgorithm::Sha256, b"hello");

        // Known SHA-256 hash of "hello"
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_digest_sizes() {
        for alg in [
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            assert_eq!(digest(alg, b"").len(), alg.digest_size());
        }
    }

    #[test]
    fn test_reference_content_digest() {
        let hash = digest(
            DigestAlgorithm::Sha256,
            b"Content-Type: text/plain\r\n\r\nhello world",
        );
        assert_eq!(
            hex::encode(hash),
            "e770311810aea72798c62f6a0f8156f12b71ce9bc145c8f780ec4248b2214f69"
        );
    }
}
