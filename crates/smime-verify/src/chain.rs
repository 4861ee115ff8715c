//! Trust evaluation
//!
//! Paths are at most two hops long. A signer is trusted when it is a store
//! entry, when a store entry issued it, or when a candidate intermediate
//! issued it and a store entry issued that intermediate. An intermediate
//! that is itself a store entry is covered by the second rule.
//! Each hop is checked cryptographically with [`verify_issued_by`]; name
//! matching only selects which issuers to try.

use crate::verdict::{TrustError, TrustPath};
use chrono::{DateTime, Utc};
use smime_crypto::verify_issued_by;
use smime_trust::TrustStore;
use smime_types::Certificate;

/// Find a trust path for `signer`
///
/// When `time` is given, every certificate on the path must be valid then.
/// Paths that fail only the validity check are passed over; if no other
/// path exists the first validity failure is reported.
pub(crate) fn evaluate_trust(
    signer: &Certificate,
    candidates: &[&Certificate],
    store: &TrustStore,
    time: Option<DateTime<Utc>>,
) -> Result<TrustPath, TrustError> {
    let mut validity_failure: Option<TrustError> = None;
    let mut accept = |path: TrustPath| -> Option<TrustPath> {
        let result = time.map_or(Ok(()), |t| {
            std::iter::once(signer)
                .chain(path.issuers())
                .try_for_each(|cert| check_validity(cert, t))
        });
        match result {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::debug!(error = %e, "trust path rejected");
                validity_failure.get_or_insert(e);
                None
            }
        }
    };

    if store.is_directly_trusted(signer) {
        tracing::debug!(signer = %signer.subject(), "signer is a trust store entry");
        if let Some(path) = accept(TrustPath::Direct) {
            return Ok(path);
        }
    }

    for anchor in store.issuers_of(signer) {
        if issued_by(signer, anchor) {
            tracing::debug!(anchor = %anchor.subject(), "signer issued by trust store entry");
            if let Some(path) = accept(TrustPath::Anchor {
                anchor: anchor.clone(),
            }) {
                return Ok(path);
            }
        }
    }

    let intermediates = candidates
        .iter()
        .copied()
        .filter(|c| *c != signer && c.subject() == signer.issuer());
    for intermediate in intermediates {
        if !issued_by(signer, intermediate) {
            continue;
        }

        for anchor in store.issuers_of(intermediate) {
            if issued_by(intermediate, anchor) {
                tracing::debug!(
                    intermediate = %intermediate.subject(),
                    anchor = %anchor.subject(),
                    "signer chains to trust store entry through intermediate"
                );
                if let Some(path) = accept(TrustPath::Intermediate {
                    intermediate: intermediate.clone(),
                    anchor: anchor.clone(),
                }) {
                    return Ok(path);
                }
            }
        }
    }

    Err(validity_failure.unwrap_or_else(|| TrustError::UntrustedSigner {
        subject: signer.subject().to_string(),
    }))
}

/// Check that `cert` is valid at `time`
pub(crate) fn check_validity(cert: &Certificate, time: DateTime<Utc>) -> Result<(), TrustError> {
    if time < cert.not_before() {
        return Err(TrustError::CertificateNotYetValid {
            subject: cert.subject().to_string(),
            not_before: cert.not_before(),
        });
    }
    if time > cert.not_after() {
        return Err(TrustError::CertificateExpired {
            subject: cert.subject().to_string(),
            not_after: cert.not_after(),
        });
    }
    Ok(())
}

fn issued_by(child: &Certificate, issuer: &Certificate) -> bool {
    match verify_issued_by(child, issuer) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(
                child = %child.subject(),
                issuer = %issuer.subject(),
                error = %e,
                "issuer check failed"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &[u8] = include_bytes!("../test_data/certs/root.der");
    const INTER: &[u8] = include_bytes!("../test_data/certs/inter.der");
    const INTER2: &[u8] = include_bytes!("../test_data/certs/inter2.der");
    const LEAF: &[u8] = include_bytes!("../test_data/certs/leaf.der");
    const DEEP: &[u8] = include_bytes!("../test_data/certs/deep.der");
    const REFERENCE: &[u8] = include_bytes!("../test_data/certs/reference.der");

    fn cert(der: &[u8]) -> Certificate {
        Certificate::from_der(der).unwrap()
    }

    fn store(certs: &[&[u8]]) -> TrustStore {
        certs.iter().map(|der| cert(der)).collect()
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_direct() {
        let reference = cert(REFERENCE);
        let path = evaluate_trust(&reference, &[], &store(&[REFERENCE]), None).unwrap();
        assert_eq!(path, TrustPath::Direct);
    }

    #[test]
    fn test_anchor() {
        let leaf = cert(LEAF);
        let path = evaluate_trust(&leaf, &[], &store(&[INTER]), None).unwrap();
        assert_eq!(path, TrustPath::Anchor { anchor: cert(INTER) });
    }

    #[test]
    fn test_intermediate_to_anchor() {
        let leaf = cert(LEAF);
        let inter = cert(INTER);
        let path = evaluate_trust(&leaf, &[&inter, &leaf], &store(&[ROOT]), None).unwrap();
        assert_eq!(
            path,
            TrustPath::Intermediate {
                intermediate: inter,
                anchor: cert(ROOT),
            }
        );
    }

    #[test]
    fn test_trusted_intermediate() {
        let deep = cert(DEEP);
        let inter2 = cert(INTER2);
        let path = evaluate_trust(&deep, &[&inter2], &store(&[INTER2, ROOT]), None).unwrap();
        // inter2 is a store entry, so it is reached as an anchor first
        assert_eq!(path, TrustPath::Anchor { anchor: inter2 });
    }

    #[test]
    fn test_three_hops_is_too_deep() {
        let deep = cert(DEEP);
        let inter2 = cert(INTER2);
        let inter = cert(INTER);
        let result = evaluate_trust(&deep, &[&inter2, &inter, &deep], &store(&[ROOT]), None);
        assert!(matches!(result, Err(TrustError::UntrustedSigner { .. })));
    }

    #[test]
    fn test_unrelated_store() {
        let leaf = cert(LEAF);
        let result = evaluate_trust(&leaf, &[], &store(&[ROOT, REFERENCE]), None);
        assert!(matches!(result, Err(TrustError::UntrustedSigner { .. })));
    }

    #[test]
    fn test_validity_time() {
        let reference = cert(REFERENCE);
        let trusted = store(&[REFERENCE]);

        let time = Some(at("2021-05-20T18:50:49Z"));
        assert!(evaluate_trust(&reference, &[], &trusted, time).is_ok());
        assert!(matches!(
            evaluate_trust(&reference, &[], &trusted, Some(at("2040-01-01T00:00:00Z"))),
            Err(TrustError::CertificateExpired { .. })
        ));
        assert!(matches!(
            evaluate_trust(&reference, &[], &trusted, Some(at("2016-01-01T00:00:00Z"))),
            Err(TrustError::CertificateNotYetValid { .. })
        ));
    }
}
