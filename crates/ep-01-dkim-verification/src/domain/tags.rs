//! # Tag-Value Parser
//!
//! Parsing of `tag=value; ...` parameter lists (signature fields and key
//! records), `:`-separated tag lists, and base64 tag values.

use super::entities::TagMap;
use super::errors::StructuralError;
use base64::{engine::general_purpose, Engine as _};

/// Parse `tag=value` pairs separated by `;`.
///
/// Tags and values are trimmed. Empty segments (such as a trailing `;`) are
/// skipped. A repeated tag keeps its last value.
///
/// # Errors
/// * `StructuralError::MalformedTag` - a non-empty segment has no `=`
pub fn parse_header_params(value: &str) -> Result<TagMap, StructuralError> {
    let mut tags = TagMap::default();
    for segment in value.split(';') {
        match segment.split_once('=') {
            Some((tag, value)) => tags.insert(tag.trim().to_owned(), value.trim().to_owned()),
            None if segment.trim().is_empty() => continue,
            None => return Err(StructuralError::MalformedTag(segment.trim().to_owned())),
        }
    }
    Ok(tags)
}

/// Split a `:`-separated list, removing whitespace from every element.
///
/// Order and duplicates are preserved.
pub fn parse_tag_list(value: &str) -> Vec<String> {
    value.split(':').map(strip_whitespace).collect()
}

/// Remove every whitespace character, including folding CRLFs.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Decode a standard-alphabet base64 tag value, ignoring whitespace.
///
/// # Errors
/// * `StructuralError::MalformedBase64` - the value is not valid base64
pub fn decode_base64(tag: &'static str, value: &str) -> Result<Vec<u8>, StructuralError> {
    general_purpose::STANDARD
        .decode(strip_whitespace(value))
        .map_err(|e| StructuralError::MalformedBase64 {
            tag,
            reason: e.to_string(),
        })
}

/// Blank out the value of every `b=` tag in a raw signature field.
///
/// Everything from after the `=` up to the next `;` (or the end of the field,
/// trailing CRLF included) is dropped. The `bh` tag and all other bytes are
/// untouched.
pub fn remove_signature_value(raw_field: &[u8]) -> Vec<u8> {
    let Some(colon) = raw_field.iter().position(|&b| b == b':') else {
        return raw_field.to_vec();
    };

    let mut out = Vec::with_capacity(raw_field.len());
    out.extend_from_slice(&raw_field[..=colon]);

    let mut rest = &raw_field[colon + 1..];
    loop {
        let end = rest.iter().position(|&b| b == b';').unwrap_or(rest.len());
        let segment = &rest[..end];

        match segment.iter().position(|&b| b == b'=') {
            Some(eq) if segment[..eq].trim_ascii() == b"b" => out.extend_from_slice(&segment[..=eq]),
            _ => out.extend_from_slice(segment),
        }

        if end == rest.len() {
            return out;
        }
        out.push(b';');
        rest = &rest[end + 1..];
    }
}

// =============================================================================
// TESTS
// =============================================================================
