//! # Signer Address Extraction
//!
//! Locates the angle-bracket address of the `From` field inside the
//! canonical header bytes, the same bytes the header circuit slices.

use crate::config::AddressBinding;
use crate::errors::EncodingError;

const FROM_TOKEN: &[u8] = b"from:";
const FROM_NAME: &[u8] = b"from";
const CRLF: &[u8] = b"\r\n";

/// Address pulled out of the canonical `From` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerAddress {
    raw: Vec<u8>,
    at: Option<usize>,
}

impl SignerAddress {
    /// Extract the address between the first `<`/`>` pair after `from:`.
    ///
    /// With `AddressBinding::FromField` the field name must start a header
    /// line (case-insensitive, whitespace allowed before the colon) and the
    /// scan covers that field including its continuation lines. With
    /// `AddressBinding::FirstToken` the first literal `from:` anywhere is used
    /// and the scan runs to the end of the buffer.
    ///
    /// # Errors
    /// * `EncodingError::AddressNotFound` - no token, or no `<...>` after it
    pub fn extract(header: &[u8], binding: AddressBinding) -> Result<Self, EncodingError> {
        let (value_start, end) = match binding {
            AddressBinding::FromField => {
                let value_start = find_from_field(header).ok_or(EncodingError::AddressNotFound)?;
                (value_start, field_end(header, value_start))
            }
            AddressBinding::FirstToken => {
                let start = find(header, FROM_TOKEN).ok_or(EncodingError::AddressNotFound)?;
                (start + FROM_TOKEN.len(), header.len())
            }
        };

        let scan = &header[value_start..end];
        let close = scan
            .iter()
            .position(|&b| b == b'>')
            .ok_or(EncodingError::AddressNotFound)?;
        // Last `<` before the first `>`.
        let open = scan[..close]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or(EncodingError::AddressNotFound)?;

        let raw = scan[open + 1..close].to_vec();
        let at = raw.iter().rposition(|&b| b == b'@');
        Ok(Self { raw, at })
    }

    /// The address bytes exactly as they appear between the brackets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Part before the last `@` (the whole address if there is none).
    pub fn local_part(&self) -> &[u8] {
        match self.at {
            Some(at) => &self.raw[..at],
            None => &self.raw,
        }
    }

    /// Part after the last `@`.
    pub fn domain(&self) -> Option<&[u8]> {
        self.at.map(|at| &self.raw[at + 1..])
    }
}

/// Offset just past the colon of the first line that is a `from` field.
fn find_from_field(header: &[u8]) -> Option<usize> {
    let mut line_start = 0;
    while line_start < header.len() {
        let line = &header[line_start..];
        if let Some(colon) = from_colon(line) {
            return Some(line_start + colon + 1);
        }
        line_start += find(line, CRLF)? + CRLF.len();
    }
    None
}

/// Position of the colon when `line` starts with `from`, optional blanks, `:`.
fn from_colon(line: &[u8]) -> Option<usize> {
    let name = FROM_NAME.len();
    if line.len() < name || !line[..name].eq_ignore_ascii_case(FROM_NAME) {
        return None;
    }
    let colon = name + line[name..].iter().take_while(|&&b| is_blank(b)).count();
    (line.get(colon) == Some(&b':')).then_some(colon)
}

/// End of the field containing `from`: the first CRLF not followed by a blank.
fn field_end(header: &[u8], from: usize) -> usize {
    let mut pos = from;
    while let Some(i) = find(&header[pos..], CRLF) {
        let crlf = pos + i;
        match header.get(crlf + CRLF.len()) {
            Some(&b) if is_blank(b) => pos = crlf + CRLF.len(),
            _ => return crlf,
        }
    }
    header.len()
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
