//! # Hash/Signature Extractor
//!
//! Computes the canonical body hash and the canonical header hash while
//! retaining the exact bytes fed to each hasher.

use super::canonicalization::Canonicalization;
use super::entities::{HashAlgorithm, HeaderField, ValidatedSignature};
use super::errors::{StructuralError, VerificationError};
use super::header::HeaderPicker;
use super::tags::{decode_base64, remove_signature_value};
use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};
use subtle::ConstantTimeEq;
use tracing::debug;

// =============================================================================
// HASHING
// =============================================================================

/// Running digest for one of the accepted hash algorithms.
#[derive(Clone, Debug)]
pub enum HashAccumulator {
    /// SHA-256 state
    Sha256(Sha256),
}

impl HashAccumulator {
    /// Fresh state for `algorithm`.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    /// Absorb bytes.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
        }
    }

    /// Final digest.
    pub fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
        }
    }
}

/// Writer that hashes everything written and keeps a copy.
#[derive(Debug)]
pub struct RetainingHasher {
    hasher: HashAccumulator,
    retained: Vec<u8>,
}

impl RetainingHasher {
    /// Start hashing with `algorithm`.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            hasher: HashAccumulator::new(algorithm),
            retained: Vec::new(),
        }
    }

    /// Hash and retain `data`.
    pub fn absorb(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.retained.extend_from_slice(data);
    }

    /// Digest and retained bytes.
    pub fn finish(self) -> (Vec<u8>, Vec<u8>) {
        (self.hasher.finalize(), self.retained)
    }
}

impl Write for RetainingHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.absorb(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A digest together with the exact bytes that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashedBytes {
    /// Digest of `canonical`
    pub digest: Vec<u8>,
    /// Canonicalized bytes as hashed
    pub canonical: Vec<u8>,
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Decoded `bh` and `b` tag values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertedValues {
    /// Body hash claimed by the signer
    pub body_hash: Vec<u8>,
    /// Signature bytes
    pub signature: Vec<u8>,
}

/// Decode `bh` and `b`.
///
/// # Errors
/// * `StructuralError::MissingTag` - either tag is absent
/// * `StructuralError::MalformedBase64` - either value is not base64
pub fn decode_asserted_values(
    signature: &ValidatedSignature,
) -> Result<AssertedValues, StructuralError> {
    let body_hash = signature
        .tags
        .get("bh")
        .ok_or(StructuralError::MissingTag("bh"))?;
    let value = signature
        .tags
        .get("b")
        .ok_or(StructuralError::MissingTag("b"))?;
    Ok(AssertedValues {
        body_hash: decode_base64("bh", body_hash)?,
        signature: decode_base64("b", value)?,
    })
}

/// Canonicalize and hash the body in one streaming pass.
///
/// # Errors
/// * `StructuralError::Read` - the body reader failed
pub fn hash_body<R: Read + ?Sized>(
    body: &mut R,
    canonicalization: Canonicalization,
    algorithm: HashAlgorithm,
) -> Result<HashedBytes, StructuralError> {
    let mut writer = canonicalization.body_writer(RetainingHasher::new(algorithm));
    io::copy(body, &mut writer).map_err(|e| StructuralError::Read(e.to_string()))?;
    let (digest, canonical) = writer
        .finish()
        .map_err(|e| StructuralError::Read(e.to_string()))?
        .finish();
    Ok(HashedBytes { digest, canonical })
}

/// Compare the computed body hash with `bh` in constant time.
///
/// # Errors
/// * `VerificationError::BodyHashMismatch` - digests differ (including length)
pub fn verify_body_hash(computed: &[u8], asserted: &[u8]) -> Result<(), VerificationError> {
    if bool::from(computed.ct_eq(asserted)) {
        debug!("Body hash verified");
        Ok(())
    } else {
        Err(VerificationError::BodyHashMismatch)
    }
}

/// Canonicalize and hash the signed header fields followed by the signature
/// field with its `b=` value emptied and no trailing line break.
///
/// Names in `h` are matched bottom-up; a name with no unused instance left
/// contributes nothing.
pub fn hash_header(
    fields: &[HeaderField],
    signature_field: &HeaderField,
    signature: &ValidatedSignature,
) -> HashedBytes {
    let algorithm = signature.canonicalization.header;
    let mut hasher = RetainingHasher::new(signature.hash_algorithm);
    let mut picker = HeaderPicker::new(fields);

    for name in &signature.signed_headers {
        if let Some(field) = picker.pick(name) {
            hasher.absorb(&algorithm.canonicalize_header(&field.raw));
        }
    }

    let stripped = remove_signature_value(&signature_field.raw);
    let canonical = algorithm.canonicalize_header(&stripped);
    let trimmed_len = canonical
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |last| last + 1);
    hasher.absorb(&canonical[..trimmed_len]);

    let (digest, canonical) = hasher.finish();
    HashedBytes { digest, canonical }
}

// =============================================================================
// TESTS
// =============================================================================
