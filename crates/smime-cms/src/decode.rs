//! SignedData decoding with resource limits

use crate::asn1::SignedDataAsn1;
use crate::error::{DecodeError, Result};
use crate::scan::scan;
use crate::signed_data::{
    AlgorithmId, AuthenticatedAttributes, SignedData, SignerId, SignerInfo, OID_CONTENT_TYPE,
    OID_MESSAGE_DIGEST, OID_SIGNED_DATA, OID_SIGNING_TIME,
};
use chrono::{DateTime, Utc};
use cms::content_info::ContentInfo;
use cms::signed_data::{SignedAttributes, SignerIdentifier};
use const_oid::ObjectIdentifier;
use der::asn1::OctetString;
use der::{Any, Decode, Encode, SliceReader, Tag, Tagged};
use smime_types::Certificate;
use x509_cert::attr::Attribute;
use x509_cert::time::Time;

/// Bounds applied to untrusted envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    /// Largest accepted envelope in bytes
    pub max_envelope_len: usize,
    /// Deepest accepted TLV nesting
    pub max_depth: usize,
    /// Most embedded certificates
    pub max_certificates: usize,
    /// Most SignerInfo entries
    pub max_signer_infos: usize,
    /// Most signed attributes per SignerInfo
    pub max_attributes: usize,
}

impl DecoderLimits {
    /// Default limits: 1 MiB, depth 32, 64 certificates, 16 signers and
    /// 64 attributes per signer
    pub fn new() -> Self {
        Self {
            max_envelope_len: 1024 * 1024,
            max_depth: 32,
            max_certificates: 64,
            max_signer_infos: 16,
            max_attributes: 64,
        }
    }

    /// Set the largest accepted envelope size
    pub fn with_max_envelope_len(mut self, len: usize) -> Self {
        self.max_envelope_len = len;
        self
    }

    /// Set the deepest accepted nesting
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the largest accepted number of embedded certificates
    pub fn with_max_certificates(mut self, count: usize) -> Self {
        self.max_certificates = count;
        self
    }

    /// Set the largest accepted number of signers
    pub fn with_max_signer_infos(mut self, count: usize) -> Self {
        self.max_signer_infos = count;
        self
    }

    /// Set the largest accepted number of signed attributes per signer
    pub fn with_max_attributes(mut self, count: usize) -> Self {
        self.max_attributes = count;
        self
    }
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes ContentInfo-wrapped SignedData envelopes
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    limits: DecoderLimits,
}

impl Decoder {
    /// Create a decoder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with custom limits
    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self { limits }
    }

    /// Limits in effect
    pub fn limits(&self) -> &DecoderLimits {
        &self.limits
    }

    /// Decode a DER ContentInfo carrying SignedData.
    ///
    /// The buffer is first scanned structurally, so truncation, trailing
    /// bytes, indefinite lengths and excessive nesting are reported before
    /// any field is interpreted.
    pub fn decode(&self, bytes: &[u8]) -> Result<SignedData> {
        if bytes.len() > self.limits.max_envelope_len {
            return Err(DecodeError::LimitExceeded(format!(
                "envelope is {} bytes, limit is {}",
                bytes.len(),
                self.limits.max_envelope_len
            )));
        }

        let shape = scan(bytes, self.limits.max_depth)?;
        tracing::debug!(
            "Envelope structure: {} values, depth {}",
            shape.nodes,
            shape.depth
        );

        let content_info = ContentInfo::from_der(bytes)?;
        if content_info.content_type != OID_SIGNED_DATA {
            return Err(DecodeError::UnexpectedContentType(
                content_info.content_type.to_string(),
            ));
        }

        let version = probe_version(&content_info.content)?;
        if !matches!(version, 1 | 3 | 4 | 5) {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let signed_der = content_info.content.to_der()?;
        let signed = SignedDataAsn1::from_der(&signed_der)?;

        let digest_algorithms = signed
            .digest_algorithms
            .iter()
            .map(AlgorithmId::from_x509)
            .collect::<der::Result<Vec<_>>>()?;

        let content = signed
            .encap_content_info
            .econtent
            .as_ref()
            .map(|econtent| {
                econtent
                    .decode_as::<OctetString>()
                    .map(|octets| octets.as_bytes().to_vec())
                    .map_err(|e| DecodeError::Malformed(format!("eContent: {}", e)))
            })
            .transpose()?;

        let certificates = self.decode_certificates(signed.certificates.as_deref().unwrap_or(&[]))?;
        let crl_count = signed.crls.as_ref().map_or(0, Vec::len);

        if signed.signer_infos.0.is_empty() {
            return Err(DecodeError::MissingSignerInfos);
        }
        if signed.signer_infos.0.len() > self.limits.max_signer_infos {
            return Err(DecodeError::LimitExceeded(format!(
                "{} signer infos, limit is {}",
                signed.signer_infos.0.len(),
                self.limits.max_signer_infos
            )));
        }

        let signer_infos = signed
            .signer_infos
            .0
            .iter()
            .map(|si| self.decode_signer_info(si))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Decoded SignedData v{}: {} certificate(s), {} signer(s), {}",
            version,
            certificates.len(),
            signer_infos.len(),
            if content.is_some() { "embedded content" } else { "detached" }
        );

        Ok(SignedData {
            version,
            digest_algorithms,
            content_type: signed.encap_content_info.econtent_type,
            content,
            certificates,
            crl_count,
            signer_infos,
        })
    }

    fn decode_certificates(&self, choices: &[Any]) -> Result<Vec<Certificate>> {
        if choices.len() > self.limits.max_certificates {
            return Err(DecodeError::LimitExceeded(format!(
                "{} certificates, limit is {}",
                choices.len(),
                self.limits.max_certificates
            )));
        }

        let mut certificates = Vec::with_capacity(choices.len());
        for (index, choice) in choices.iter().enumerate() {
            if choice.tag() != Tag::Sequence {
                tracing::debug!(
                    "Skipping non-X.509 certificate choice {} with tag {}",
                    index,
                    choice.tag()
                );
                continue;
            }

            let der = choice.to_der()?;
            let cert = Certificate::from_der(&der).map_err(|e| {
                DecodeError::Malformed(format!("embedded certificate {}: {}", index, e))
            })?;
            certificates.push(cert);
        }

        Ok(certificates)
    }

    fn decode_signer_info(&self, si: &cms::signed_data::SignerInfo) -> Result<SignerInfo> {
        let sid = match &si.sid {
            SignerIdentifier::IssuerAndSerialNumber(ias) => SignerId::IssuerAndSerial {
                issuer: ias.issuer.clone(),
                serial: ias.serial_number.clone(),
            },
            SignerIdentifier::SubjectKeyIdentifier(ski) => {
                SignerId::SubjectKeyId(ski.0.as_bytes().to_vec())
            }
        };

        let authenticated_attributes = si
            .signed_attrs
            .as_ref()
            .map(|attrs| self.decode_attributes(attrs))
            .transpose()?;

        Ok(SignerInfo {
            version: si.version as u8,
            sid,
            digest_algorithm: AlgorithmId::from_x509(&si.digest_alg)?,
            signature_algorithm: AlgorithmId::from_x509(&si.signature_algorithm)?,
            authenticated_attributes,
            signature: si.signature.as_bytes().to_vec(),
        })
    }

    fn decode_attributes(&self, attrs: &SignedAttributes) -> Result<AuthenticatedAttributes> {
        if attrs.len() > self.limits.max_attributes {
            return Err(DecodeError::LimitExceeded(format!(
                "{} signed attributes, limit is {}",
                attrs.len(),
                self.limits.max_attributes
            )));
        }

        let mut seen: Vec<ObjectIdentifier> = Vec::with_capacity(attrs.len());
        let mut content_type = None;
        let mut message_digest = None;
        let mut signing_time = None;

        for attr in attrs.iter() {
            if seen.contains(&attr.oid) {
                return Err(DecodeError::Malformed(format!(
                    "duplicate signed attribute {}",
                    attr.oid
                )));
            }
            seen.push(attr.oid);

            match attr.oid {
                OID_CONTENT_TYPE => {
                    let value = single_value(attr, "content-type")?;
                    content_type = Some(value.decode_as::<ObjectIdentifier>().map_err(|e| {
                        DecodeError::Malformed(format!("content-type attribute: {}", e))
                    })?);
                }
                OID_MESSAGE_DIGEST => {
                    let value = single_value(attr, "message-digest")?;
                    let octets = value.decode_as::<OctetString>().map_err(|e| {
                        DecodeError::Malformed(format!("message-digest attribute: {}", e))
                    })?;
                    message_digest = Some(octets.as_bytes().to_vec());
                }
                OID_SIGNING_TIME => {
                    let value = single_value(attr, "signing-time")?;
                    let time = Time::from_der(&value.to_der()?).map_err(|e| {
                        DecodeError::Malformed(format!("signing-time attribute: {}", e))
                    })?;
                    signing_time = Some(to_datetime(&time)?);
                }
                _ => {}
            }
        }

        // DER of the SET OF, without the [0] IMPLICIT tag used in SignerInfo
        let encoded = attrs.to_der()?;

        Ok(AuthenticatedAttributes {
            attributes: attrs.iter().cloned().collect(),
            encoded,
            content_type,
            message_digest,
            signing_time,
        })
    }
}

/// Decode a SignedData envelope with default limits
pub fn decode(bytes: &[u8]) -> Result<SignedData> {
    Decoder::new().decode(bytes)
}

/// Read the version field before committing to the full schema
fn probe_version(content: &Any) -> Result<u32> {
    if content.tag() != Tag::Sequence {
        return Err(DecodeError::InvalidTag(format!(
            "SignedData must be a SEQUENCE, found {}",
            content.tag()
        )));
    }
    let mut reader = SliceReader::new(content.value())?;
    Ok(u32::decode(&mut reader)?)
}

fn single_value<'a>(attr: &'a Attribute, name: &str) -> Result<&'a Any> {
    if attr.values.len() != 1 {
        return Err(DecodeError::Malformed(format!(
            "{} attribute must have exactly one value, found {}",
            name,
            attr.values.len()
        )));
    }
    attr.values
        .get(0)
        .ok_or_else(|| DecodeError::Malformed(format!("{} attribute has no value", name)))
}

fn to_datetime(time: &Time) -> Result<DateTime<Utc>> {
    let since_epoch = time.to_unix_duration();
    i64::try_from(since_epoch.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, since_epoch.subsec_nanos()))
        .ok_or_else(|| DecodeError::Malformed("signing-time out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &[u8] = include_bytes!("../test_data/reference.p7s");

    #[test]
    fn test_limits_builder() {
        let limits = DecoderLimits::new()
            .with_max_envelope_len(10)
            .with_max_depth(4)
            .with_max_certificates(1)
            .with_max_signer_infos(2)
            .with_max_attributes(3);
        assert_eq!(limits.max_envelope_len, 10);
        assert_eq!(limits.max_depth, 4);
        assert_eq!(limits.max_certificates, 1);
        assert_eq!(limits.max_signer_infos, 2);
        assert_eq!(limits.max_attributes, 3);
        assert_eq!(DecoderLimits::default(), DecoderLimits::new());
    }

    #[test]
    fn test_probe_version() {
        let content_info = ContentInfo::from_der(REFERENCE).unwrap();
        assert_eq!(probe_version(&content_info.content).unwrap(), 1);
    }

    #[test]
    fn test_signing_time_conversion() {
        let signed = decode(REFERENCE).unwrap();
        let attrs = signed.signer_infos()[0].authenticated_attributes().unwrap();
        assert_eq!(
            attrs.signing_time().unwrap().to_rfc3339(),
            "2021-05-20T18:50:49+00:00"
        );
    }
}
