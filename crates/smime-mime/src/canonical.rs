//! Canonical form of the signed content

use std::borrow::Cow;

/// How the first part of a multipart/signed message is turned into the
/// bytes that get digested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Canonicalization {
    /// Digest exactly the bytes that were transmitted
    #[default]
    Exact,
    /// Text mode: every line ends in CRLF and trailing spaces and tabs
    /// are stripped before each line break
    Text,
}

/// Apply `mode` to `content`.
///
/// `Exact` borrows the input unchanged. In `Text` mode a final line without
/// a terminator is kept as is, since its end is the end of the part.
pub fn canonicalize(content: &[u8], mode: Canonicalization) -> Cow<'_, [u8]> {
    match mode {
        Canonicalization::Exact => Cow::Borrowed(content),
        Canonicalization::Text => Cow::Owned(to_text(content)),
    }
}

fn to_text(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + content.len() / 32);
    let mut rest = content;

    while let Some(lf) = rest.iter().position(|&b| b == b'\n') {
        let line = &rest[..lf];
        let end = line
            .iter()
            .rposition(|&b| !matches!(b, b' ' | b'\t' | b'\r'))
            .map_or(0, |i| i + 1);
        out.extend_from_slice(&line[..end]);
        out.extend_from_slice(b"\r\n");
        rest = &rest[lf + 1..];
    }

    out.extend_from_slice(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_borrowed() {
        let input = b"line  \nnext";
        let out = canonicalize(input, Canonicalization::Exact);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(&*out, input);
    }

    #[test]
    fn test_text_mode() {
        let out = canonicalize(
            b"Content-Type: text/plain\n\ntrailing spaces   \nand a tab\t\nend",
            Canonicalization::Text,
        );
        assert_eq!(
            &*out,
            b"Content-Type: text/plain\r\n\r\ntrailing spaces\r\nand a tab\r\nend"
        );
    }

    #[test]
    fn test_text_mode_is_stable_on_canonical_input() {
        let input = b"a\r\nb\r\n\r\nc";
        let out = canonicalize(input, Canonicalization::Text);
        assert_eq!(&*out, input);
        assert_eq!(&*canonicalize(&out, Canonicalization::Text), input);
    }

    #[test]
    fn test_text_mode_keeps_unterminated_tail() {
        let out = canonicalize(b"x \t", Canonicalization::Text);
        assert_eq!(&*out, b"x \t");
    }
}
