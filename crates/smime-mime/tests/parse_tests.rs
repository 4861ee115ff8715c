//! Parsing tests against OpenSSL-produced S/MIME messages

use rstest::rstest;
use smime_mime::{
    parse, parse_with_content_type, read_smime, Canonicalization, ParseError, SmimeMessage,
};
use smime_types::DigestAlgorithm;

const REFERENCE: &[u8] = include_bytes!("../test_data/reference.eml");
const TWO_HOP: &[u8] = include_bytes!("../test_data/two_hop.eml");
const TEXT_CANON: &[u8] = include_bytes!("../test_data/text_canon.eml");
const OPAQUE: &[u8] = include_bytes!("../test_data/opaque.eml");

const REFERENCE_BOUNDARY: &str = "----9B5319FF2E4428B17CD26B69294E7F31";

/// Split a message into its Content-Type value and body
fn split_headers(raw: &[u8]) -> (String, &[u8]) {
    let text = std::str::from_utf8(raw).unwrap();
    let sep = text.find("\n\n").unwrap();
    let content_type = text[..sep]
        .lines()
        .find_map(|l| l.strip_prefix("Content-Type: "))
        .unwrap()
        .to_string();
    (content_type, &raw[sep + 2..])
}

// ==== Reference message ====

#[test]
fn test_parse_reference_message() {
    let message = parse(REFERENCE).unwrap();

    assert_eq!(message.boundary(), REFERENCE_BOUNDARY);
    assert_eq!(message.protocol(), Some("application/x-pkcs7-signature"));
    assert_eq!(message.micalg(), Some("sha-256"));
    assert_eq!(message.micalg_algorithms(), vec![DigestAlgorithm::Sha256]);
    assert_eq!(message.headers().get("mime-version"), Some("1.0"));

    assert_eq!(
        &*message.signed_content(Canonicalization::Exact),
        b"Content-Type: text/plain\r\n\r\nhello world"
    );
    assert_eq!(message.text_content().unwrap(), b"hello world");

    // SEQUENCE, 790 bytes in total
    assert_eq!(message.envelope().len(), 790);
    assert_eq!(message.envelope()[0], 0x30);
}

#[test]
fn test_parts_keep_their_headers() {
    let message = parse(REFERENCE).unwrap();
    let [content, signature] = message.parts();

    assert_eq!(content.headers().get("content-type"), Some("text/plain"));
    assert_eq!(content.body(), b"hello world");
    assert_eq!(
        signature.headers().get("Content-Disposition"),
        Some("attachment; filename=\"smime.p7s\"")
    );
    let ct = signature.content_type().unwrap().unwrap();
    assert_eq!(ct.param("name"), Some("smime.p7s"));
}

#[test]
fn test_parse_with_external_content_type() {
    let (content_type, body) = split_headers(REFERENCE);
    let external = parse_with_content_type(body, &content_type).unwrap();
    let full = parse(REFERENCE).unwrap();

    assert!(external.headers().is_empty());
    assert_eq!(external.boundary(), full.boundary());
    assert_eq!(
        external.signed_content(Canonicalization::Exact),
        full.signed_content(Canonicalization::Exact)
    );
    assert_eq!(external.envelope(), full.envelope());
}

#[rstest]
#[case::reference(REFERENCE, b"hello world".as_slice())]
#[case::two_hop(TWO_HOP, b"hello from the chain".as_slice())]
fn test_signed_text(#[case] raw: &[u8], #[case] text: &[u8]) {
    let message = parse(raw).unwrap();
    let mut expected = b"Content-Type: text/plain\r\n\r\n".to_vec();
    expected.extend_from_slice(text);

    assert_eq!(&*message.signed_content(Canonicalization::Exact), expected);
    assert_eq!(message.text_content().unwrap(), text);
}

// ==== Canonicalization ====

#[test]
fn test_text_canonicalization() {
    let message = parse(TEXT_CANON).unwrap();

    assert_eq!(
        &*message.signed_content(Canonicalization::Exact),
        b"Content-Type: text/plain\n\ntrailing spaces   \nand a tab\t\nend"
    );
    assert_eq!(
        &*message.signed_content(Canonicalization::Text),
        b"Content-Type: text/plain\r\n\r\ntrailing spaces\r\nand a tab\r\nend"
    );
    assert_eq!(message.protocol(), Some("application/pkcs7-signature"));
}

// ==== Opaque messages ====

#[test]
fn test_read_smime_dispatch() {
    match read_smime(REFERENCE).unwrap() {
        SmimeMessage::Signed(m) => assert_eq!(m.boundary(), REFERENCE_BOUNDARY),
        other => panic!("expected detached message, got {:?}", other),
    }

    match read_smime(OPAQUE).unwrap() {
        SmimeMessage::Opaque(m) => {
            assert_eq!(m.smime_type(), Some("signed-data"));
            assert_eq!(m.envelope().len(), 878);
            assert_eq!(
                m.headers().get("content-disposition"),
                Some("attachment; filename=\"smime.p7m\"")
            );
        }
        other => panic!("expected opaque message, got {:?}", other),
    }
}

#[test]
fn test_parse_rejects_opaque() {
    assert!(matches!(
        parse(OPAQUE),
        Err(ParseError::UnsupportedContentType(t)) if t == "application/x-pkcs7-mime"
    ));
}

// ==== Framing errors ====

fn reference_with(from: &str, to: &str) -> Vec<u8> {
    String::from_utf8(REFERENCE.to_vec())
        .unwrap()
        .replacen(from, to, 1)
        .into_bytes()
}

#[test]
fn test_missing_boundary() {
    let raw = reference_with(&format!("; boundary=\"{}\"", REFERENCE_BOUNDARY), "");
    assert_eq!(parse(&raw), Err(ParseError::MissingBoundary));
}

#[test]
fn test_declared_boundary_not_in_body() {
    let raw = reference_with(REFERENCE_BOUNDARY, "----0000000000000000000000000000000");
    assert!(matches!(parse(&raw), Err(ParseError::Malformed(_))));
}

#[test]
fn test_missing_close_delimiter() {
    let close = format!("--{}--", REFERENCE_BOUNDARY);
    let text = String::from_utf8(REFERENCE.to_vec()).unwrap();
    let cut = text.rfind(&close).unwrap();
    assert!(matches!(
        parse(&REFERENCE[..cut]),
        Err(ParseError::Malformed(_))
    ));
}

#[test]
fn test_three_parts_rejected() {
    let delimiter = format!("--{}\n", REFERENCE_BOUNDARY);
    let raw = reference_with(
        &delimiter,
        &format!("{}Content-Type: text/plain\n\nextra\n{}", delimiter, delimiter),
    );
    assert!(matches!(parse(&raw), Err(ParseError::Malformed(_))));
}

#[test]
fn test_wrong_signature_part_type() {
    let raw = reference_with(
        "Content-Type: application/x-pkcs7-signature",
        "Content-Type: application/octet-stream",
    );
    assert!(matches!(parse(&raw), Err(ParseError::Malformed(_))));
}

#[test]
fn test_corrupt_base64() {
    let raw = reference_with("MIIDEgYJ", "MIID*gYJ");
    assert!(matches!(parse(&raw), Err(ParseError::BadEncoding(_))));
}

#[test]
fn test_unsupported_transfer_encoding() {
    let raw = reference_with(
        "Content-Transfer-Encoding: base64",
        "Content-Transfer-Encoding: quoted-printable",
    );
    assert_eq!(
        parse(&raw),
        Err(ParseError::UnsupportedTransferEncoding(
            "quoted-printable".to_string()
        ))
    );
}

#[test]
fn test_text_content_requires_text_plain() {
    let raw = reference_with("Content-Type: text/plain\r", "Content-Type: text/html\r");
    let message = parse(&raw).unwrap();
    assert_eq!(
        message.text_content(),
        Err(ParseError::NotTextPlain("text/html".to_string()))
    );
}

#[rstest]
#[case::not_multipart("text/plain")]
#[case::mixed("multipart/mixed; boundary=x")]
fn test_unsupported_top_level(#[case] content_type: &str) {
    assert!(matches!(
        parse_with_content_type(b"", content_type),
        Err(ParseError::UnsupportedContentType(_))
    ));
}
