//! RFC 5322 header blocks and the RFC 2045 Content-Type field

use crate::error::{ParseError, Result};

/// A single unfolded header field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Field name as transmitted
    pub name: String,
    /// Unfolded field value with surrounding whitespace removed
    pub value: String,
}

/// Ordered header fields of an entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<Header>);

impl Headers {
    /// Create an empty header list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a header field
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Header {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Value of the first field with this name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Parsed Content-Type field, if present
    pub fn content_type(&self) -> Result<Option<ContentType>> {
        self.get("content-type").map(ContentType::parse).transpose()
    }

    /// Iterate over fields in transmission order
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.0.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a header block (everything before the blank separator line)
    pub(crate) fn parse(block: &[u8]) -> Result<Self> {
        let mut headers: Vec<Header> = Vec::new();

        for line in lines(block) {
            if line.is_empty() {
                continue;
            }

            let text = String::from_utf8_lossy(line);
            if line[0] == b' ' || line[0] == b'\t' {
                let last = headers.last_mut().ok_or_else(|| {
                    ParseError::Malformed("continuation line before first header".to_string())
                })?;
                let folded = text.trim();
                if !folded.is_empty() {
                    if !last.value.is_empty() {
                        last.value.push(' ');
                    }
                    last.value.push_str(folded);
                }
                continue;
            }

            let (name, value) = text
                .split_once(':')
                .ok_or_else(|| ParseError::Malformed(format!("invalid header line: {:?}", text)))?;
            let name = name.trim_end();
            if name.is_empty()
                || name
                    .bytes()
                    .any(|b| b.is_ascii_whitespace() || b.is_ascii_control())
            {
                return Err(ParseError::Malformed(format!("invalid header name: {:?}", name)));
            }

            headers.push(Header {
                name: name.to_string(),
                value: value.trim().to_string(),
            });
        }

        Ok(Self(headers))
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Split an entity at the blank line separating headers from body.
///
/// Returns the header block and the offset of the first body byte, or
/// `None` for the offset when the entity has no blank line at all.
pub(crate) fn split_entity(entity: &[u8]) -> (&[u8], Option<usize>) {
    let mut pos = 0;
    while pos < entity.len() {
        let line_end = entity[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| pos + i);
        let Some(lf) = line_end else {
            break;
        };
        let line = &entity[pos..lf];
        if line.is_empty() || line == b"\r" {
            return (&entity[..pos], Some(lf + 1));
        }
        pos = lf + 1;
    }
    (entity, None)
}

/// Iterate over lines without their LF / CRLF terminators
fn lines(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    block
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// A parsed Content-Type value: media type plus parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    mime_type: String,
    params: Vec<(String, String)>,
}

impl ContentType {
    /// Parse a Content-Type field value such as
    /// `multipart/signed; protocol="application/pkcs7-signature"; boundary=abc`
    pub fn parse(value: &str) -> Result<Self> {
        let (mime_type, mut rest) = match value.find(';') {
            Some(i) => (&value[..i], &value[i + 1..]),
            None => (value, ""),
        };

        let mime_type = mime_type.trim().to_ascii_lowercase();
        match mime_type.split_once('/') {
            Some((top, sub)) if !top.is_empty() && !sub.is_empty() => {}
            _ => {
                return Err(ParseError::Malformed(format!(
                    "invalid media type: {:?}",
                    mime_type
                )))
            }
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(|c: char| c == ';' || c.is_ascii_whitespace());
            if rest.is_empty() {
                break;
            }

            let Some(eq) = rest.find(|c| c == '=' || c == ';') else {
                tracing::debug!("Ignoring Content-Type parameter without value: {}", rest);
                break;
            };
            if rest.as_bytes()[eq] == b';' {
                tracing::debug!("Ignoring Content-Type parameter without value: {}", &rest[..eq]);
                rest = &rest[eq..];
                continue;
            }

            let name = rest[..eq].trim().to_ascii_lowercase();
            let after = rest[eq + 1..].trim_start();
            let (param_value, remaining) = if let Some(quoted) = after.strip_prefix('"') {
                parse_quoted(quoted)?
            } else {
                let end = after.find(';').unwrap_or(after.len());
                (after[..end].trim_end().to_string(), &after[end..])
            };

            if !name.is_empty() {
                params.push((name, param_value));
            }
            rest = remaining;
        }

        Ok(Self { mime_type, params })
    }

    /// Lowercased `type/subtype`
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether the media type equals `mime` (case-insensitive)
    pub fn is(&self, mime: &str) -> bool {
        self.mime_type.eq_ignore_ascii_case(mime)
    }

    /// Value of the first parameter named `name` (case-insensitive)
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` parameter pairs
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl std::str::FromStr for ContentType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse the remainder of a quoted-string (opening quote already consumed)
fn parse_quoted(input: &str) -> Result<(String, &str)> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &input[i + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err(ParseError::Malformed(
        "unterminated quoted string in Content-Type".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers_with_folding() {
        let block =
            b"MIME-Version: 1.0\r\nContent-Type: multipart/signed;\r\n\tboundary=\"abc\"\r\n";
        let headers = Headers::parse(block).unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("mime-version"), Some("1.0"));
        assert_eq!(
            headers.get("CONTENT-TYPE"),
            Some("multipart/signed; boundary=\"abc\"")
        );
    }

    #[test]
    fn test_parse_headers_rejects_garbage() {
        assert!(matches!(
            Headers::parse(b"not a header\n"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            Headers::parse(b" leading continuation\n"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_split_entity() {
        let (headers, body) = split_entity(b"A: 1\r\nB: 2\r\n\r\nbody\r\n");
        assert_eq!(headers, b"A: 1\r\nB: 2\r\n");
        assert_eq!(body, Some(14));

        let (headers, body) = split_entity(b"\nonly body");
        assert!(headers.is_empty());
        assert_eq!(body, Some(1));

        let (_, body) = split_entity(b"A: 1\nno separator");
        assert_eq!(body, None);
    }

    #[test]
    fn test_content_type_params() {
        let ct = ContentType::parse(concat!(
            "Multipart/Signed; protocol=\"application/x-pkcs7-signature\"; ",
            "micalg=\"sha-256\"; boundary=\"----9B5319FF2E4428B17CD26B69294E7F31\"",
        ))
        .unwrap();

        assert_eq!(ct.mime_type(), "multipart/signed");
        assert!(ct.is("multipart/signed"));
        assert_eq!(ct.param("protocol"), Some("application/x-pkcs7-signature"));
        assert_eq!(ct.param("MICALG"), Some("sha-256"));
        assert_eq!(
            ct.param("boundary"),
            Some("----9B5319FF2E4428B17CD26B69294E7F31")
        );
    }

    #[test]
    fn test_content_type_token_and_escapes() {
        let ct: ContentType = "text/plain; charset=us-ascii ; name=\"a \\\"b\\\" c\""
            .parse()
            .unwrap();
        assert_eq!(ct.param("charset"), Some("us-ascii"));
        assert_eq!(ct.param("name"), Some("a \"b\" c"));
        assert_eq!(ct.params().count(), 2);
    }

    #[test]
    fn test_content_type_errors() {
        assert!(matches!(
            ContentType::parse("multipart"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            ContentType::parse("multipart/signed; boundary=\"open"),
            Err(ParseError::Malformed(_))
        ));
    }
}
