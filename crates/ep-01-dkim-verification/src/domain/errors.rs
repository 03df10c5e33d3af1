//! # Verification Errors
//!
//! Error taxonomy for the DKIM verification pipeline.
//!
//! Every variant is terminal: the pipeline stops at the first failure and
//! emits no artifacts. Each error carries a stable dotted reason code.

use ep_02_circuit_inputs::EncodingError;
use thiserror::Error;

/// The message or signature is not well-formed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructuralError {
    /// End of input reached before the blank line ending the header block
    #[error("Header block is not terminated by an empty line")]
    MissingHeaderBoundary,

    /// A folded continuation line appears before any header field
    #[error("Continuation line without a preceding header field")]
    OrphanContinuation,

    /// Reading the message failed
    #[error("Failed to read message: {0}")]
    Read(String),

    /// A tag-list segment has no `=`
    #[error("Malformed tag segment: {0:?}")]
    MalformedTag(String),

    /// Signature field value is not valid UTF-8
    #[error("Signature field is not valid UTF-8")]
    NonUtf8Signature,

    /// A tag required for verification is absent
    #[error("Signature is missing required tag `{0}`")]
    MissingTag(&'static str),

    /// A base64 tag value failed to decode
    #[error("Malformed base64 in tag `{tag}`: {reason}")]
    MalformedBase64 { tag: &'static str, reason: String },
}

/// The signature is well-formed but violates verification policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// `v` is not `1`
    #[error("Unsupported signature version: {0:?}")]
    UnsupportedVersion(String),

    /// The `From` field is not in the signed header list
    #[error("From header is not signed")]
    FromNotSigned,

    /// `a` has no `-` between key and hash algorithm
    #[error("Malformed algorithm name: {0:?}")]
    MalformedAlgorithm(String),

    /// The key record restricts hash algorithms and this one is not listed
    #[error("Hash algorithm {0:?} not permitted by key")]
    HashNotAllowedByKey(String),

    /// Deprecated hash algorithm (sha1)
    #[error("Hash algorithm {0:?} is too weak")]
    WeakHashAlgorithm(String),

    /// Unknown hash algorithm
    #[error("Unsupported hash algorithm: {0:?}")]
    UnsupportedHashAlgorithm(String),

    /// Key algorithm in the signature differs from the key record
    #[error("Key algorithm mismatch: signature uses {signature:?}, key is {key:?}")]
    KeyAlgorithmMismatch { signature: String, key: String },

    /// The key record's service list excludes email
    #[error("Key is not valid for the email service")]
    ServiceNotAllowed,

    /// Unknown canonicalization name
    #[error("Unsupported canonicalization: {0:?}")]
    UnsupportedCanonicalization(String),

    /// `l` tag present; part of the body would be unsigned
    #[error("Signature contains an insecure body length tag")]
    InsecureBodyLength,
}

/// The verification key could not be obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// None of the listed query methods is registered
    #[error("No supported key query method in {0:?}")]
    NoRecognizedMethod(Vec<String>),

    /// No key record published
    #[error("No key record at {0}")]
    NoKey(String),

    /// More than one key record published
    #[error("{count} key records at {name}, expected one")]
    MultipleKeyRecords { name: String, count: usize },

    /// The lookup capability failed
    #[error("Key lookup failed: {0}")]
    Lookup(String),

    /// The key record is not a valid tag list
    #[error("Malformed key record: {0}")]
    MalformedKeyRecord(String),

    /// Key record `v` is not `DKIM1`
    #[error("Incompatible key record version: {0:?}")]
    IncompatibleKeyVersion(String),

    /// Key record has an empty `p` tag
    #[error("Key has been revoked")]
    KeyRevoked,

    /// Key type other than RSA
    #[error("Unsupported key algorithm: {0:?}")]
    UnsupportedKeyAlgorithm(String),

    /// RSA modulus below the accepted minimum
    #[error("Key is too short: {bits} bits, need {min}")]
    KeyTooShort { bits: usize, min: usize },

    /// Key bytes could not be parsed
    #[error("Invalid public key: {0}")]
    InvalidKey(String),
}

/// Top-level pipeline error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Malformed message or signature
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    /// Signature rejected by policy
    #[error("Policy violation: {0}")]
    Policy(#[from] PolicyError),

    /// Key lookup failed
    #[error("Key resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Computed body hash differs from `bh`
    #[error("Body hash did not verify")]
    BodyHashMismatch,

    /// No signature header in the message
    #[error("No DKIM signature found")]
    NoSignature,

    /// More than one signature header and the policy requires exactly one
    #[error("Found {count} DKIM signatures, expected one")]
    MultipleSignatures { count: usize },

    /// Verified values do not fit the circuit input shape
    #[error("Circuit input encoding failed: {0}")]
    Encoding(#[from] EncodingError),
}

impl VerificationError {
    /// Stable reason code, e.g. `policy.insecure_body_length`.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Structural(e) => match e {
                StructuralError::MissingHeaderBoundary => "structural.missing_header_boundary",
                StructuralError::OrphanContinuation => "structural.orphan_continuation",
                StructuralError::Read(_) => "structural.read",
                StructuralError::MalformedTag(_) => "structural.malformed_tag",
                StructuralError::NonUtf8Signature => "structural.non_utf8_signature",
                StructuralError::MissingTag(_) => "structural.missing_tag",
                StructuralError::MalformedBase64 { .. } => "structural.malformed_base64",
            },
            Self::Policy(e) => match e {
                PolicyError::UnsupportedVersion(_) => "policy.unsupported_version",
                PolicyError::FromNotSigned => "policy.from_not_signed",
                PolicyError::MalformedAlgorithm(_) => "policy.malformed_algorithm",
                PolicyError::HashNotAllowedByKey(_) => "policy.hash_not_allowed_by_key",
                PolicyError::WeakHashAlgorithm(_) => "policy.weak_hash_algorithm",
                PolicyError::UnsupportedHashAlgorithm(_) => "policy.unsupported_hash_algorithm",
                PolicyError::KeyAlgorithmMismatch { .. } => "policy.key_algorithm_mismatch",
                PolicyError::ServiceNotAllowed => "policy.service_not_allowed",
                PolicyError::UnsupportedCanonicalization(_) => "policy.unsupported_canonicalization",
                PolicyError::InsecureBodyLength => "policy.insecure_body_length",
            },
            Self::Resolution(e) => match e {
                ResolutionError::NoRecognizedMethod(_) => "resolution.no_recognized_method",
                ResolutionError::NoKey(_) => "resolution.no_key",
                ResolutionError::MultipleKeyRecords { .. } => "resolution.multiple_key_records",
                ResolutionError::Lookup(_) => "resolution.lookup",
                ResolutionError::MalformedKeyRecord(_) => "resolution.malformed_key_record",
                ResolutionError::IncompatibleKeyVersion(_) => "resolution.incompatible_key_version",
                ResolutionError::KeyRevoked => "resolution.key_revoked",
                ResolutionError::UnsupportedKeyAlgorithm(_) => "resolution.unsupported_key_algorithm",
                ResolutionError::KeyTooShort { .. } => "resolution.key_too_short",
                ResolutionError::InvalidKey(_) => "resolution.invalid_key",
            },
            Self::BodyHashMismatch => "verification.body_hash_mismatch",
            Self::NoSignature => "signature.none",
            Self::MultipleSignatures { .. } => "signature.multiple",
            Self::Encoding(e) => e.reason_code(),
        }
    }
}
