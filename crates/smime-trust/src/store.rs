//! Trust store

use crate::error::Result;
use smime_types::Certificate;
use std::collections::HashSet;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;

/// A set of certificates the caller is willing to accept as signers or as
/// issuers of signers.
///
/// The store is built once and then only read; share it by reference (or
/// behind an `Arc`) between verifications running on different threads.
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    certificates: Vec<Certificate>,
    seen: HashSet<Certificate>,
}

impl TrustStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a certificate
    ///
    /// Returns `false` if an identical certificate was already present.
    pub fn add(&mut self, cert: Certificate) -> bool {
        if !self.seen.insert(cert.clone()) {
            return false;
        }
        tracing::debug!(
            subject = %cert.subject(),
            serial = %cert.serial_hex(),
            "added trusted certificate"
        );
        self.certificates.push(cert);
        true
    }

    /// Decode a DER certificate and add it
    pub fn add_der(&mut self, der: &[u8]) -> Result<bool> {
        let cert = Certificate::from_der(der)?;
        Ok(self.add(cert))
    }

    /// Whether `cert` itself is in the store
    ///
    /// A certificate matches an entry with the same DER encoding, or one
    /// with the same issuer, serial number and public key (a re-encoding of
    /// the same certificate).
    pub fn is_directly_trusted(&self, cert: &Certificate) -> bool {
        self.seen.contains(cert)
            || self.certificates.iter().any(|entry| {
                entry.issuer() == cert.issuer()
                    && entry.serial_number() == cert.serial_number()
                    && entry.same_public_key(cert)
            })
    }

    /// Store entries whose subject is `cert`'s issuer
    pub fn issuers_of<'a>(
        &'a self,
        cert: &'a Certificate,
    ) -> impl Iterator<Item = &'a Certificate> + 'a {
        self.certificates
            .iter()
            .filter(move |entry| entry.subject() == cert.issuer())
    }

    /// Entry with the given issuer and serial number
    pub fn find(&self, issuer: &Name, serial: &SerialNumber) -> Option<&Certificate> {
        self.certificates
            .iter()
            .find(|entry| entry.issuer() == issuer && entry.serial_number() == serial)
    }

    /// Number of certificates
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Whether the store holds no certificates
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter()
    }
}

impl FromIterator<Certificate> for TrustStore {
    fn from_iter<I: IntoIterator<Item = Certificate>>(iter: I) -> Self {
        let mut store = TrustStore::new();
        store.extend(iter);
        store
    }
}

impl Extend<Certificate> for TrustStore {
    fn extend<I: IntoIterator<Item = Certificate>>(&mut self, iter: I) {
        for cert in iter {
            self.add(cert);
        }
    }
}

impl<'a> IntoIterator for &'a TrustStore {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &[u8] = include_bytes!("../test_data/root.der");
    const INTER: &[u8] = include_bytes!("../test_data/inter.der");

    #[test]
    fn test_add_deduplicates() {
        let mut store = TrustStore::new();
        assert!(store.add_der(ROOT).unwrap());
        assert!(!store.add_der(ROOT).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_der_rejects_garbage() {
        let mut store = TrustStore::new();
        assert!(store.add_der(b"not a certificate").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_collect() {
        let store: TrustStore = [ROOT, INTER, ROOT]
            .into_iter()
            .map(|der| Certificate::from_der(der).unwrap())
            .collect();
        assert_eq!(store.len(), 2);
        assert_eq!((&store).into_iter().count(), 2);
    }
}
