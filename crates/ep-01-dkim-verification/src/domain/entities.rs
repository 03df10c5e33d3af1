//! # Domain Entities
//!
//! Core data structures for DKIM verification.

use super::canonicalization::CanonicalizationPair;
use ep_02_circuit_inputs::{CombinedInputs, SignatureInputs, SignerAddress};
use rsa::RsaPublicKey;
use std::collections::HashMap;

// =============================================================================
// Message Types
// =============================================================================

/// One header field as received, including folded continuation lines.
///
/// Every physical line is terminated by CRLF regardless of the line ending
/// used on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderField {
    /// Position in the original header block
    pub index: usize,
    /// Name, colon, value and continuation lines
    pub raw: Vec<u8>,
}

impl HeaderField {
    /// Field name with surrounding whitespace removed.
    pub fn name(&self) -> &[u8] {
        super::header::parse_header_field(&self.raw).0
    }

    /// Field value with surrounding whitespace removed.
    pub fn value(&self) -> &[u8] {
        super::header::parse_header_field(&self.raw).1
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name.as_bytes())
    }
}

/// The signature header chosen for verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureRecord {
    /// Index of the signature field in the header block
    pub index: usize,
    /// Field value (everything after the colon, trimmed)
    pub value: String,
}

/// Parsed `tag=value` pairs of a signature or key record.
///
/// Tag names are case-sensitive. On duplicates the last occurrence wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagMap {
    tags: HashMap<String, String>,
}

impl TagMap {
    /// Insert a tag, replacing any previous value.
    pub fn insert(&mut self, tag: String, value: String) {
        self.tags.insert(tag, value);
    }

    /// Value of a tag, if present.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// True if the tag is present (even with an empty value).
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True when no tags were parsed.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// =============================================================================
// Key Types
// =============================================================================

/// A resolved verification key and the constraints its record declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyQueryResult {
    /// The RSA public key
    pub key: RsaPublicKey,
    /// Declared key algorithm (`k` tag, default `rsa`)
    pub key_algorithm: String,
    /// Allowed hash algorithms; `None` means unconstrained
    pub hash_algorithms: Option<Vec<String>>,
    /// Allowed services; `None` means unconstrained (absent or `*`)
    pub services: Option<Vec<String>>,
    /// Record flags (`t` tag)
    pub flags: Vec<String>,
    /// Free-form notes (`n` tag)
    pub notes: Option<String>,
}

// =============================================================================
// Algorithm Types
// =============================================================================

/// Hash algorithms accepted for signing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Name as used in the `a` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// Signature tags that passed the checks not needing the key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSignature {
    /// Signing domain (`d`), whitespace removed
    pub domain: String,
    /// Selector (`s`), whitespace removed
    pub selector: String,
    /// Signed header names (`h`), in order, duplicates kept
    pub signed_headers: Vec<String>,
    /// Key query methods to try (`q`, or the configured default)
    pub query_methods: Vec<String>,
    /// All parsed tags
    pub tags: TagMap,
}

/// Signature parameters that passed every policy check.
#[derive(Clone, Debug)]
pub struct ValidatedSignature {
    /// Signing domain (`d`)
    pub domain: String,
    /// Selector (`s`), whitespace removed
    pub selector: String,
    /// Signed header names (`h`), in order, duplicates kept
    pub signed_headers: Vec<String>,
    /// Key algorithm component of `a`
    pub key_algorithm: String,
    /// Hash algorithm component of `a`
    pub hash_algorithm: HashAlgorithm,
    /// Header and body canonicalization (`c`)
    pub canonicalization: CanonicalizationPair,
    /// The resolved key
    pub key: KeyQueryResult,
    /// All parsed tags
    pub tags: TagMap,
}

// =============================================================================
// Verification Output
// =============================================================================

/// Result of a successful verification run.
///
/// The asymmetric check of `signature` against `header_hash` is not performed
/// here; the signature circuit (or any external RSA verifier) does it.
#[derive(Clone, Debug)]
pub struct VerifiedEmail {
    /// Signing domain (`d`)
    pub domain: String,
    /// Selector (`s`)
    pub selector: String,
    /// Canonicalization used
    pub canonicalization: CanonicalizationPair,
    /// Digest of the canonical header bytes
    pub header_hash: Vec<u8>,
    /// Body hash asserted by `bh` (equal to the computed one)
    pub body_hash: Vec<u8>,
    /// Decoded signature bytes (`b`)
    pub signature: Vec<u8>,
    /// Key the signature should verify under
    pub public_key: RsaPublicKey,
    /// Address found in the canonical `From` field
    pub signer: SignerAddress,
    /// Signature circuit inputs
    pub signature_inputs: SignatureInputs,
    /// Header/body/address circuit inputs
    pub combined_inputs: CombinedInputs,
}

impl VerifiedEmail {
    /// Canonical header bytes exactly as hashed.
    pub fn canonical_header(&self) -> &[u8] {
        &self.combined_inputs.header
    }

    /// Canonical body bytes exactly as hashed.
    pub fn canonical_body(&self) -> &[u8] {
        &self.combined_inputs.body
    }
}
