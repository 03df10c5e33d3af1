//! # Header Splitter
//!
//! Splits a raw message into header fields and leaves the reader at the
//! first body byte. Also picks signed fields back out of the header block.

use super::entities::{HeaderField, SignatureRecord};
use super::errors::StructuralError;
use std::collections::HashMap;
use std::io::BufRead;

const CRLF: &[u8] = b"\r\n";

/// Read header fields up to and including the empty separator line.
///
/// Continuation lines (starting with space or tab) are appended to the
/// preceding field. Each physical line is re-terminated with CRLF. On return
/// `reader` is positioned at the start of the body.
///
/// # Errors
/// * `StructuralError::MissingHeaderBoundary` - input ends inside the header block
/// * `StructuralError::OrphanContinuation` - the first line is a continuation
/// * `StructuralError::Read` - the reader failed
pub fn split_header<R: BufRead>(reader: &mut R) -> Result<Vec<HeaderField>, StructuralError> {
    let mut fields: Vec<HeaderField> = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| StructuralError::Read(e.to_string()))?;
        if read == 0 {
            return Err(StructuralError::MissingHeaderBoundary);
        }

        let content = strip_line_ending(&line);
        if content.is_empty() {
            return Ok(fields);
        }

        if matches!(content[0], b' ' | b'\t') {
            let field = fields.last_mut().ok_or(StructuralError::OrphanContinuation)?;
            field.raw.extend_from_slice(content);
            field.raw.extend_from_slice(CRLF);
        } else {
            let mut raw = Vec::with_capacity(content.len() + 2);
            raw.extend_from_slice(content);
            raw.extend_from_slice(CRLF);
            fields.push(HeaderField {
                index: fields.len(),
                raw,
            });
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Split a raw field on the first `:` into trimmed name and value.
///
/// A field without a colon is all name and has an empty value.
pub fn parse_header_field(raw: &[u8]) -> (&[u8], &[u8]) {
    match raw.iter().position(|&b| b == b':') {
        Some(colon) => (raw[..colon].trim_ascii(), raw[colon + 1..].trim_ascii()),
        None => (raw.trim_ascii(), &[]),
    }
}

/// All fields named `field_name` (case-insensitive), in header order.
///
/// # Errors
/// * `StructuralError::NonUtf8Signature` - a matching field value is not UTF-8
pub fn find_signatures(
    fields: &[HeaderField],
    field_name: &str,
) -> Result<Vec<SignatureRecord>, StructuralError> {
    fields
        .iter()
        .filter(|field| field.has_name(field_name))
        .map(|field| -> Result<SignatureRecord, StructuralError> {
            let value = std::str::from_utf8(field.value())
                .map_err(|_| StructuralError::NonUtf8Signature)?;
            Ok(SignatureRecord {
                index: field.index,
                value: value.to_owned(),
            })
        })
        .collect()
}

/// Picks signed header fields from the bottom of the header block up.
///
/// A name listed `n` times selects the last `n` instances of that field,
/// bottom-most first. No instance is ever returned twice.
pub struct HeaderPicker<'a> {
    fields: &'a [HeaderField],
    picked: HashMap<String, usize>,
}

impl<'a> HeaderPicker<'a> {
    /// Create a picker over a header block.
    pub fn new(fields: &'a [HeaderField]) -> Self {
        Self {
            fields,
            picked: HashMap::new(),
        }
    }

    /// Next unconsumed instance of `name`, or `None` if all are used.
    pub fn pick(&mut self, name: &str) -> Option<&'a HeaderField> {
        let key = name.to_ascii_lowercase();
        let skip = self.picked.get(&key).copied().unwrap_or(0);
        let field = self
            .fields
            .iter()
            .rev()
            .filter(|field| field.has_name(&key))
            .nth(skip)?;
        *self.picked.entry(key).or_insert(0) += 1;
        Some(field)
    }
}

// =============================================================================
// TESTS
// =============================================================================
