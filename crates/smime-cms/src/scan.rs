//! Structural pre-scan of an untrusted DER buffer
//!
//! Walks every TLV in the buffer without interpreting it, so that framing
//! errors are reported precisely and resource limits are enforced before
//! any typed decoding allocates. The walk is iterative: an explicit stack
//! of parent end offsets replaces recursion.

use crate::error::{DecodeError, Result};
use der::{Decode, Header, Reader, SliceReader};

/// Shape of a scanned buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanSummary {
    /// Total number of TLVs
    pub nodes: usize,
    /// Deepest nesting level reached (outer value is depth 1)
    pub depth: usize,
}

/// Check that `bytes` is exactly one definite-length TLV tree no deeper
/// than `max_depth`
pub(crate) fn scan(bytes: &[u8], max_depth: usize) -> Result<ScanSummary> {
    if bytes.is_empty() {
        return Err(DecodeError::Truncated);
    }

    let mut ends: Vec<usize> = Vec::new();
    let mut pos = 0;
    let mut summary = ScanSummary { nodes: 0, depth: 0 };

    loop {
        while ends.last() == Some(&pos) {
            ends.pop();
        }

        if ends.is_empty() && pos > 0 {
            if pos < bytes.len() {
                return Err(DecodeError::TrailingData);
            }
            return Ok(summary);
        }

        let limit = ends.last().copied().unwrap_or(bytes.len());
        let (header, header_len) = read_header(&bytes[pos..limit])?;
        let value_len = usize::try_from(header.length)?;
        let end = pos
            .checked_add(header_len)
            .and_then(|v| v.checked_add(value_len))
            .ok_or(DecodeError::Truncated)?;

        if end > limit {
            return Err(if limit == bytes.len() {
                DecodeError::Truncated
            } else {
                DecodeError::Malformed(format!(
                    "value at offset {} overruns its enclosing value",
                    pos
                ))
            });
        }

        summary.nodes += 1;
        if header.tag.is_constructed() {
            if ends.len() >= max_depth {
                return Err(DecodeError::LimitExceeded(format!(
                    "nesting deeper than {}",
                    max_depth
                )));
            }
            ends.push(end);
            summary.depth = summary.depth.max(ends.len());
            pos += header_len;
        } else {
            pos = end;
        }
    }
}

/// Decode one identifier and length, returning the header and its size
fn read_header(input: &[u8]) -> Result<(Header, usize)> {
    // Low tag number form with the indefinite length marker
    if input.len() >= 2 && input[0] & 0x1f != 0x1f && input[1] == 0x80 {
        return Err(DecodeError::IndefiniteLength);
    }

    let mut reader = SliceReader::new(input)?;
    let header = Header::decode(&mut reader)?;
    let header_len = usize::try_from(reader.position())?;
    Ok((header, header_len))
}
