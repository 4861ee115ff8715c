//! multipart/signed (RFC 1847) and application/pkcs7-mime framing
//!
//! A detached S/MIME message is a two-part multipart entity: the first part
//! is the signed content and the second carries the base64 SignedData
//! envelope. The first part is kept byte for byte, because the signature
//! covers exactly what was transmitted between the delimiters.

use crate::canonical::{canonicalize, Canonicalization};
use crate::error::{ParseError, Result};
use crate::header::{split_entity, ContentType, Headers};
use base64::Engine;
use smime_types::DigestAlgorithm;
use std::borrow::Cow;

/// Media types accepted for the signature part of multipart/signed
const SIGNATURE_TYPES: [&str; 2] = [
    "application/pkcs7-signature",
    "application/x-pkcs7-signature",
];

/// Media types accepted for opaque signed messages
const OPAQUE_TYPES: [&str; 2] = ["application/pkcs7-mime", "application/x-pkcs7-mime"];

/// RFC 2046 section 5.1.1 limits boundaries to 70 characters
const MAX_BOUNDARY_LEN: usize = 70;

/// One body part of a multipart entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    headers: Headers,
    raw: Vec<u8>,
    body_start: usize,
}

impl MimePart {
    /// Parse a part, requiring a well-formed header block
    fn parse_strict(raw: &[u8]) -> Result<Self> {
        let (block, body_start) = split_entity(raw);
        let body_start = body_start.ok_or_else(|| {
            ParseError::Malformed("body part has no header separator".to_string())
        })?;
        Ok(Self {
            headers: Headers::parse(block)?,
            raw: raw.to_vec(),
            body_start,
        })
    }

    /// Parse a part whose headers are informational only.
    ///
    /// The signed content part is digested as raw bytes, so a header block
    /// this parser does not understand must not make it unreadable.
    fn parse_lenient(raw: &[u8]) -> Self {
        let (block, body_start) = split_entity(raw);
        match (Headers::parse(block), body_start) {
            (Ok(headers), Some(body_start)) => Self {
                headers,
                raw: raw.to_vec(),
                body_start,
            },
            (Ok(headers), None) => Self {
                headers,
                raw: raw.to_vec(),
                body_start: raw.len(),
            },
            (Err(e), _) => {
                tracing::debug!("Treating content part as headerless: {}", e);
                Self {
                    headers: Headers::new(),
                    raw: raw.to_vec(),
                    body_start: 0,
                }
            }
        }
    }

    /// Part headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The full entity (headers, separator and body) as transmitted
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Part body following the blank separator line
    pub fn body(&self) -> &[u8] {
        &self.raw[self.body_start..]
    }

    /// Parsed Content-Type of this part, if present
    pub fn content_type(&self) -> Result<Option<ContentType>> {
        self.headers.content_type()
    }
}

/// A parsed multipart/signed message with a detached signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    boundary: String,
    headers: Headers,
    protocol: Option<String>,
    micalg: Option<String>,
    content: MimePart,
    signature: MimePart,
    envelope: Vec<u8>,
}

impl SignedMessage {
    /// The boundary declared in the Content-Type header
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Top-level headers (empty when parsed from a body and an external
    /// Content-Type value)
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Declared `protocol` parameter
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// Declared `micalg` parameter, verbatim
    pub fn micalg(&self) -> Option<&str> {
        self.micalg.as_deref()
    }

    /// Digest algorithms named by `micalg` that this crate recognizes
    ///
    /// `micalg` may list several comma-separated names when there are
    /// several signers.
    pub fn micalg_algorithms(&self) -> Vec<DigestAlgorithm> {
        self.micalg
            .as_deref()
            .map(|m| m.split(',').filter_map(DigestAlgorithm::from_micalg).collect())
            .unwrap_or_default()
    }

    /// The signed content part
    pub fn content_part(&self) -> &MimePart {
        &self.content
    }

    /// The signature part
    pub fn signature_part(&self) -> &MimePart {
        &self.signature
    }

    /// Both parts in transmission order
    pub fn parts(&self) -> [&MimePart; 2] {
        [&self.content, &self.signature]
    }

    /// Transfer-decoded SignedData envelope bytes from the signature part
    pub fn envelope(&self) -> &[u8] {
        &self.envelope
    }

    /// The bytes covered by the signature under the given canonicalization
    pub fn signed_content(&self, mode: Canonicalization) -> Cow<'_, [u8]> {
        canonicalize(self.content.raw(), mode)
    }

    /// Body of the signed part with its MIME headers removed.
    ///
    /// Only available when the signed part declares `text/plain`.
    pub fn text_content(&self) -> Result<&[u8]> {
        match self.content.content_type()? {
            Some(ct) if ct.is("text/plain") => Ok(self.content.body()),
            Some(ct) => Err(ParseError::NotTextPlain(ct.mime_type().to_string())),
            None => Err(ParseError::NotTextPlain("no Content-Type".to_string())),
        }
    }
}

/// A single-part application/pkcs7-mime message with embedded content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueMessage {
    headers: Headers,
    smime_type: Option<String>,
    envelope: Vec<u8>,
}

impl OpaqueMessage {
    /// Top-level headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Declared `smime-type` parameter (normally `signed-data`)
    pub fn smime_type(&self) -> Option<&str> {
        self.smime_type.as_deref()
    }

    /// Transfer-decoded SignedData envelope bytes
    pub fn envelope(&self) -> &[u8] {
        &self.envelope
    }
}

/// Either S/MIME signing format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmimeMessage {
    /// Detached signature (multipart/signed)
    Signed(SignedMessage),
    /// Embedded content (application/pkcs7-mime)
    Opaque(OpaqueMessage),
}

impl SmimeMessage {
    /// Transfer-decoded SignedData envelope bytes
    pub fn envelope(&self) -> &[u8] {
        match self {
            SmimeMessage::Signed(m) => m.envelope(),
            SmimeMessage::Opaque(m) => m.envelope(),
        }
    }
}

/// Parse a complete multipart/signed message, top-level headers included
pub fn parse(raw: &[u8]) -> Result<SignedMessage> {
    let (headers, content_type, body) = split_top_level(raw)?;
    if !content_type.is("multipart/signed") {
        return Err(ParseError::UnsupportedContentType(
            content_type.mime_type().to_string(),
        ));
    }
    build_signed(headers, &content_type, body)
}

/// Parse a multipart/signed body given the value of its Content-Type header.
///
/// This is the form used by hosts that have already consumed the outer
/// headers (for example an HTTP or mail transport layer).
pub fn parse_with_content_type(body: &[u8], content_type: &str) -> Result<SignedMessage> {
    let content_type = ContentType::parse(content_type)?;
    if !content_type.is("multipart/signed") {
        return Err(ParseError::UnsupportedContentType(
            content_type.mime_type().to_string(),
        ));
    }
    build_signed(Headers::new(), &content_type, body)
}

/// Parse either a detached (multipart/signed) or an opaque
/// (application/pkcs7-mime) S/MIME message
pub fn read_smime(raw: &[u8]) -> Result<SmimeMessage> {
    let (headers, content_type, body) = split_top_level(raw)?;

    if content_type.is("multipart/signed") {
        return build_signed(headers, &content_type, body).map(SmimeMessage::Signed);
    }

    if OPAQUE_TYPES.iter().any(|t| content_type.is(t)) {
        let smime_type = content_type.param("smime-type").map(str::to_ascii_lowercase);
        if let Some(t) = smime_type.as_deref().filter(|t| *t != "signed-data") {
            tracing::warn!("pkcs7-mime message declares smime-type={}", t);
        }
        let envelope = decode_transfer_encoding(&headers, body)?;
        return Ok(SmimeMessage::Opaque(OpaqueMessage {
            headers,
            smime_type,
            envelope,
        }));
    }

    Err(ParseError::UnsupportedContentType(
        content_type.mime_type().to_string(),
    ))
}

fn split_top_level(raw: &[u8]) -> Result<(Headers, ContentType, &[u8])> {
    let (block, body_start) = split_entity(raw);
    let body_start = body_start
        .ok_or_else(|| ParseError::Malformed("message has no header separator".to_string()))?;
    let headers = Headers::parse(block)?;
    let content_type = headers
        .content_type()?
        .ok_or_else(|| ParseError::UnsupportedContentType("no Content-Type".to_string()))?;
    Ok((headers, content_type, &raw[body_start..]))
}

fn build_signed(
    headers: Headers,
    content_type: &ContentType,
    body: &[u8],
) -> Result<SignedMessage> {
    let boundary = content_type
        .param("boundary")
        .ok_or(ParseError::MissingBoundary)?;
    validate_boundary(boundary)?;

    let protocol = content_type.param("protocol").map(str::to_string);
    match protocol.as_deref() {
        Some(p) if SIGNATURE_TYPES.iter().any(|t| p.eq_ignore_ascii_case(t)) => {}
        Some(p) => tracing::warn!("multipart/signed declares unexpected protocol {}", p),
        None => tracing::warn!("multipart/signed has no protocol parameter"),
    }
    let micalg = content_type.param("micalg").map(str::to_string);

    let parts = split_multipart(body, boundary)?;
    let [content_raw, signature_raw] = parts[..] else {
        return Err(ParseError::Malformed(format!(
            "multipart/signed must have exactly 2 parts, found {}",
            parts.len()
        )));
    };

    let content = MimePart::parse_lenient(content_raw);
    let signature = MimePart::parse_strict(signature_raw)?;

    match signature.content_type()? {
        Some(ct) if SIGNATURE_TYPES.iter().any(|t| ct.is(t)) => {}
        Some(ct) => {
            return Err(ParseError::Malformed(format!(
                "signature part has content type {}",
                ct.mime_type()
            )))
        }
        None => {
            return Err(ParseError::Malformed(
                "signature part has no Content-Type".to_string(),
            ))
        }
    }

    let envelope = decode_transfer_encoding(signature.headers(), signature.body())?;
    tracing::debug!(
        "Parsed multipart/signed: {} content bytes, {} envelope bytes",
        content.raw().len(),
        envelope.len()
    );

    Ok(SignedMessage {
        boundary: boundary.to_string(),
        headers,
        protocol,
        micalg,
        content,
        signature,
        envelope,
    })
}

fn validate_boundary(boundary: &str) -> Result<()> {
    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
        return Err(ParseError::Malformed(format!(
            "boundary must be 1 to {} characters, got {}",
            MAX_BOUNDARY_LEN,
            boundary.len()
        )));
    }
    if boundary.bytes().any(|b| b.is_ascii_control()) || boundary.ends_with(' ') {
        return Err(ParseError::Malformed(format!(
            "invalid boundary {:?}",
            boundary
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Open,
    Close,
}

/// Classify a line (without its LF) as a boundary delimiter.
///
/// Delimiters may be followed by transport padding. A line that merely
/// starts with the boundary text is not a delimiter.
fn delimiter_kind(line: &[u8], delimiter: &[u8]) -> Option<Delimiter> {
    let rest = line.strip_prefix(delimiter)?;
    if rest.starts_with(b"--") {
        return Some(Delimiter::Close);
    }
    rest.iter()
        .all(|b| matches!(b, b' ' | b'\t' | b'\r'))
        .then_some(Delimiter::Open)
}

/// Split a multipart body into its raw body parts.
///
/// The line break before each delimiter belongs to the delimiter, so it is
/// excluded from the preceding part. Preamble and epilogue are dropped.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<&'a [u8]>> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut parts = Vec::new();
    let mut part_start: Option<usize> = None;
    let mut line_start = 0;

    loop {
        let line_end = body[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(body.len(), |i| line_start + i);

        if let Some(kind) = delimiter_kind(&body[line_start..line_end], &delimiter) {
            if let Some(start) = part_start {
                let mut end = line_start;
                if end > start {
                    end -= 1;
                    if end > start && body[end - 1] == b'\r' {
                        end -= 1;
                    }
                }
                parts.push(&body[start..end]);
            }

            match kind {
                Delimiter::Close => {
                    if part_start.is_none() {
                        return Err(ParseError::Malformed(
                            "close delimiter before first part".to_string(),
                        ));
                    }
                    return Ok(parts);
                }
                Delimiter::Open => {
                    if line_end >= body.len() {
                        break;
                    }
                    part_start = Some(line_end + 1);
                }
            }
        }

        if line_end >= body.len() {
            break;
        }
        line_start = line_end + 1;
    }

    if part_start.is_none() {
        Err(ParseError::Malformed(format!(
            "no delimiter for boundary {:?} in body",
            boundary
        )))
    } else {
        Err(ParseError::Malformed(
            "multipart body has no close delimiter".to_string(),
        ))
    }
}

/// Undo the Content-Transfer-Encoding of a body (base64 when absent)
fn decode_transfer_encoding(headers: &Headers, body: &[u8]) -> Result<Vec<u8>> {
    let encoding = headers
        .get("content-transfer-encoding")
        .map(|e| e.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "base64".to_string());

    match encoding.as_str() {
        "base64" => {
            let compact: Vec<u8> = body
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            base64::engine::general_purpose::STANDARD
                .decode(&compact)
                .map_err(|e| ParseError::BadEncoding(format!("invalid base64: {}", e)))
        }
        "7bit" | "8bit" | "binary" => Ok(body.to_vec()),
        other => Err(ParseError::UnsupportedTransferEncoding(other.to_string())),
    }
}
