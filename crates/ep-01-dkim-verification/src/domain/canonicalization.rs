//! # Canonicalization Engine
//!
//! The `simple` and `relaxed` transforms for header fields and bodies.
//!
//! Body canonicalization is a streaming [`Write`] adapter: bytes written to a
//! [`BodyCanonicalizer`] come out canonicalized on the wrapped writer. Only
//! a count of trailing CRLFs, a pending CR and (for `relaxed`) a pending
//! whitespace flag are held back until more content or
//! [`BodyCanonicalizer::finish`] decides their fate. A CR not followed by LF
//! is content in both modes.

use super::errors::PolicyError;
use super::tags::strip_whitespace;
use std::io::{self, Write};

const CRLF: &[u8] = b"\r\n";

/// A canonicalization algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Canonicalization {
    /// Bytes as received, trailing blank lines reduced
    #[default]
    Simple,
    /// Whitespace-collapsing, case-folding header names
    Relaxed,
}

impl Canonicalization {
    /// Look up an algorithm by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "simple" => Some(Self::Simple),
            "relaxed" => Some(Self::Relaxed),
            _ => None,
        }
    }

    /// Name as used in the `c` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Relaxed => "relaxed",
        }
    }

    /// Canonicalize one raw header field (name, colon, value, folding).
    ///
    /// The result always ends with CRLF.
    pub fn canonicalize_header(&self, raw: &[u8]) -> Vec<u8> {
        match self {
            Self::Simple => {
                let mut out = raw.to_vec();
                if !out.ends_with(CRLF) {
                    out.extend_from_slice(CRLF);
                }
                out
            }
            Self::Relaxed => {
                let (name, value) = match raw.iter().position(|&b| b == b':') {
                    Some(colon) => (&raw[..colon], &raw[colon + 1..]),
                    None => (raw, &[][..]),
                };

                let mut out = Vec::with_capacity(raw.len() + 2);
                out.extend(name.trim_ascii().iter().map(u8::to_ascii_lowercase));
                out.push(b':');
                let words = value
                    .split(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
                    .filter(|word| !word.is_empty());
                for (i, word) in words.enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    out.extend_from_slice(word);
                }
                out.extend_from_slice(CRLF);
                out
            }
        }
    }

    /// Wrap `inner` so that body bytes written through it are canonicalized.
    pub fn body_writer<W: Write>(self, inner: W) -> BodyCanonicalizer<W> {
        BodyCanonicalizer::new(self, inner)
    }
}

/// Header and body canonicalization from the `c` tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CanonicalizationPair {
    /// Header algorithm
    pub header: Canonicalization,
    /// Body algorithm
    pub body: Canonicalization,
}

impl CanonicalizationPair {
    /// Parse a `c` tag value of the form `header[/body]`.
    ///
    /// A missing tag or empty header half means `simple`; a missing body half
    /// means `simple`. Names are matched exactly.
    ///
    /// # Errors
    /// * `PolicyError::UnsupportedCanonicalization` - either half is unknown
    pub fn parse(tag: Option<&str>) -> Result<Self, PolicyError> {
        let Some(tag) = tag else {
            return Ok(Self::default());
        };
        let stripped = strip_whitespace(tag);
        let (header, body) = match stripped.split_once('/') {
            Some((header, body)) => (header, Some(body)),
            None => (stripped.as_str(), None),
        };

        let resolve = |name: &str| {
            Canonicalization::from_name(name)
                .ok_or_else(|| PolicyError::UnsupportedCanonicalization(name.to_owned()))
        };
        Ok(Self {
            header: if header.is_empty() {
                Canonicalization::Simple
            } else {
                resolve(header)?
            },
            body: match body {
                Some(body) => resolve(body)?,
                None => Canonicalization::Simple,
            },
        })
    }
}

// =============================================================================
// BODY CANONICALIZER
// =============================================================================

#[derive(Debug)]
enum BodyState {
    Simple {
        /// CRLFs seen since the last content byte
        pending_crlf: usize,
        /// A CR waiting to see whether LF follows
        pending_cr: bool,
    },
    Relaxed {
        /// CRLFs seen since the last content byte
        pending_crlf: usize,
        /// A CR waiting to see whether LF follows
        pending_cr: bool,
        /// Whitespace seen since the last content byte on this line
        pending_space: bool,
        /// Any content byte emitted
        written: bool,
    },
}

/// Byte-level body transform shared by the streaming writer and
/// [`canonicalize_body`].
#[derive(Debug)]
struct BodyTransform {
    state: BodyState,
    last_was_cr: bool,
}

impl BodyTransform {
    fn new(algorithm: Canonicalization) -> Self {
        let state = match algorithm {
            Canonicalization::Simple => BodyState::Simple {
                pending_crlf: 0,
                pending_cr: false,
            },
            Canonicalization::Relaxed => BodyState::Relaxed {
                pending_crlf: 0,
                pending_cr: false,
                pending_space: false,
                written: false,
            },
        };
        Self {
            state,
            last_was_cr: false,
        }
    }

    fn push(&mut self, buf: &[u8], out: &mut Vec<u8>) {
        for &byte in buf {
            if byte == b'\n' && !self.last_was_cr {
                self.feed(b'\r', out);
            }
            self.feed(byte, out);
            self.last_was_cr = byte == b'\r';
        }
    }

    fn feed(&mut self, byte: u8, out: &mut Vec<u8>) {
        match &mut self.state {
            BodyState::Simple {
                pending_crlf,
                pending_cr,
            } => match byte {
                b'\r' => {
                    if *pending_cr {
                        push_crlfs(out, *pending_crlf);
                        out.push(b'\r');
                        *pending_crlf = 0;
                    }
                    *pending_cr = true;
                }
                b'\n' if *pending_cr => {
                    *pending_crlf += 1;
                    *pending_cr = false;
                }
                _ => {
                    push_crlfs(out, *pending_crlf);
                    *pending_crlf = 0;
                    if *pending_cr {
                        out.push(b'\r');
                        *pending_cr = false;
                    }
                    out.push(byte);
                }
            },
            BodyState::Relaxed {
                pending_crlf,
                pending_cr,
                pending_space,
                written,
            } => {
                if byte == b'\n' && *pending_cr {
                    *pending_cr = false;
                    *pending_space = false;
                    *pending_crlf += 1;
                    return;
                }
                // A CR not followed by LF is content.
                if *pending_cr {
                    release_relaxed(out, pending_crlf, pending_space);
                    out.push(b'\r');
                    *pending_cr = false;
                    *written = true;
                }
                match byte {
                    b'\r' => *pending_cr = true,
                    b' ' | b'\t' => *pending_space = true,
                    b'\n' => {
                        *pending_space = false;
                        *pending_crlf += 1;
                    }
                    _ => {
                        release_relaxed(out, pending_crlf, pending_space);
                        out.push(byte);
                        *written = true;
                    }
                }
            }
        }
    }

    fn finish(self, out: &mut Vec<u8>) {
        match self.state {
            BodyState::Simple {
                pending_crlf,
                pending_cr,
            } => {
                // A trailing lone CR is content: keep it and the CRLFs before it.
                if pending_cr {
                    push_crlfs(out, pending_crlf);
                    out.push(b'\r');
                }
                out.extend_from_slice(CRLF);
            }
            BodyState::Relaxed {
                mut pending_crlf,
                pending_cr,
                mut pending_space,
                mut written,
            } => {
                if pending_cr {
                    release_relaxed(out, &mut pending_crlf, &mut pending_space);
                    out.push(b'\r');
                    written = true;
                }
                if written {
                    out.extend_from_slice(CRLF);
                }
            }
        }
    }
}

fn push_crlfs(out: &mut Vec<u8>, count: usize) {
    for _ in 0..count {
        out.extend_from_slice(CRLF);
    }
}

/// Emit held-back line breaks and the collapsed whitespace run before content.
fn release_relaxed(out: &mut Vec<u8>, pending_crlf: &mut usize, pending_space: &mut bool) {
    push_crlfs(out, *pending_crlf);
    *pending_crlf = 0;
    if *pending_space {
        out.push(b' ');
        *pending_space = false;
    }
}

/// Streaming body canonicalizer.
///
/// Bare LF line endings are normalized to CRLF before canonicalization.
/// Call [`finish`](Self::finish) after the last write; dropping the
/// canonicalizer without it loses the final line terminator.
#[derive(Debug)]
pub struct BodyCanonicalizer<W: Write> {
    inner: W,
    transform: BodyTransform,
    scratch: Vec<u8>,
}

impl<W: Write> BodyCanonicalizer<W> {
    /// Create a canonicalizer writing to `inner`.
    pub fn new(algorithm: Canonicalization, inner: W) -> Self {
        Self {
            inner,
            transform: BodyTransform::new(algorithm),
            scratch: Vec::new(),
        }
    }

    /// Flush the held-back tail, write the final terminator and return the
    /// wrapped writer.
    pub fn finish(mut self) -> io::Result<W> {
        let mut out = std::mem::take(&mut self.scratch);
        out.clear();
        self.transform.finish(&mut out);
        self.inner.write_all(&out)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for BodyCanonicalizer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = std::mem::take(&mut self.scratch);
        out.clear();
        self.transform.push(buf, &mut out);
        let result = self.inner.write_all(&out);
        self.scratch = out;
        result.map(|()| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Canonicalize a complete body held in memory.
pub fn canonicalize_body(algorithm: Canonicalization, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 2);
    let mut transform = BodyTransform::new(algorithm);
    transform.push(body, &mut out);
    transform.finish(&mut out);
    out
}

// =============================================================================
// TESTS
// =============================================================================
