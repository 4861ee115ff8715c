//! ASN.1 schema for SignedData (RFC 5652 section 5.1)
//!
//! The field types come from the `cms` crate, except for the certificate,
//! CRL and SignerInfo collections. Those are declared `SET OF` in the RFC,
//! but widely deployed signers (OpenSSL among them) emit them unsorted, and
//! the `der` set types re-sort on decode. They are read here in wire order.

use cms::signed_data::{DigestAlgorithmIdentifiers, EncapsulatedContentInfo, SignerInfo};
use der::{
    Any, Decode, DecodeValue, Encode, EncodeValue, FixedTag, Header, Length, Reader, Sequence,
    Tag, Writer,
};

/// SignedData as it appears on the wire
#[derive(Clone, Debug, Sequence)]
pub(crate) struct SignedDataAsn1 {
    /// Syntax version
    pub version: u32,
    /// Digest algorithms used by the signers
    pub digest_algorithms: DigestAlgorithmIdentifiers,
    /// Content type plus optional embedded content
    pub encap_content_info: EncapsulatedContentInfo,
    /// CertificateChoices values
    #[asn1(
        context_specific = "0",
        tag_mode = "IMPLICIT",
        constructed = "true",
        optional = "true"
    )]
    pub certificates: Option<Vec<Any>>,
    /// RevocationInfoChoice values
    #[asn1(
        context_specific = "1",
        tag_mode = "IMPLICIT",
        constructed = "true",
        optional = "true"
    )]
    pub crls: Option<Vec<Any>>,
    /// One entry per signer
    pub signer_infos: SignerInfoList,
}

/// `SignerInfos` in the order the signer wrote them
#[derive(Clone, Debug, Default)]
pub(crate) struct SignerInfoList(pub Vec<SignerInfo>);

impl FixedTag for SignerInfoList {
    const TAG: Tag = Tag::Set;
}

impl<'a> DecodeValue<'a> for SignerInfoList {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let mut infos = Vec::new();
            while !reader.is_finished() {
                infos.push(SignerInfo::decode(reader)?);
            }
            Ok(Self(infos))
        })
    }
}

impl EncodeValue for SignerInfoList {
    fn value_len(&self) -> der::Result<Length> {
        self.0
            .iter()
            .try_fold(Length::ZERO, |len, info| len + info.encoded_len()?)
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.0.iter().try_for_each(|info| info.encode(writer))
    }
}

