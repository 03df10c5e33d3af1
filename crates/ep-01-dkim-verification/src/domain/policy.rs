//! # Policy Validator
//!
//! Signature tag checks, split around key resolution:
//!
//! 1. [`PolicyValidator::precheck`] - version, required tags, `From` signed,
//!    key query method list
//! 2. key resolution (outside the domain layer)
//! 3. [`PolicyValidator::validate`] - algorithm, key constraints,
//!    canonicalization, body length
//!
//! The first failing check rejects the signature.

use super::canonicalization::CanonicalizationPair;
use super::entities::{
    HashAlgorithm, KeyQueryResult, PendingSignature, TagMap, ValidatedSignature,
};
use super::errors::{PolicyError, StructuralError, VerificationError};
use super::tags::{parse_tag_list, strip_whitespace};

/// Tags that must be present once `v` is accepted.
const REQUIRED_TAGS: [&str; 6] = ["a", "b", "bh", "d", "h", "s"];

/// Service name a key must allow when it restricts services.
const EMAIL_SERVICE: &str = "email";

/// Applies the signature policy.
#[derive(Clone, Debug)]
pub struct PolicyValidator {
    default_query_method: String,
}

impl PolicyValidator {
    /// Create a validator using `default_query_method` when `q` is absent.
    pub fn new(default_query_method: impl Into<String>) -> Self {
        Self {
            default_query_method: default_query_method.into(),
        }
    }

    /// Checks that do not need the key.
    ///
    /// # Errors
    /// * `PolicyError::UnsupportedVersion` - `v` is not `1`
    /// * `StructuralError::MissingTag` - a required tag is absent
    /// * `PolicyError::FromNotSigned` - `h` does not list `from`
    pub fn precheck(&self, tags: TagMap) -> Result<PendingSignature, VerificationError> {
        match tags.get("v") {
            Some("1") => {}
            other => {
                return Err(
                    PolicyError::UnsupportedVersion(other.unwrap_or_default().to_owned()).into(),
                )
            }
        }

        if let Some(missing) = REQUIRED_TAGS.into_iter().find(|tag| !tags.contains(tag)) {
            return Err(StructuralError::MissingTag(missing).into());
        }

        let signed_headers = parse_tag_list(tags.get("h").unwrap_or_default());
        if !signed_headers
            .iter()
            .any(|name| name.eq_ignore_ascii_case("from"))
        {
            return Err(PolicyError::FromNotSigned.into());
        }

        let query_methods = match tags.get("q") {
            Some(q) => parse_tag_list(q),
            None => vec![self.default_query_method.clone()],
        };

        Ok(PendingSignature {
            domain: strip_whitespace(tags.get("d").unwrap_or_default()),
            selector: strip_whitespace(tags.get("s").unwrap_or_default()),
            signed_headers,
            query_methods,
            tags,
        })
    }

    /// Checks against the resolved key, then the remaining tag checks.
    ///
    /// # Errors
    /// * `PolicyError::MalformedAlgorithm` - `a` has no `-`
    /// * `PolicyError::HashNotAllowedByKey` - key restricts hashes, `a` hash not listed
    /// * `PolicyError::WeakHashAlgorithm` - `sha1`
    /// * `PolicyError::UnsupportedHashAlgorithm` - anything but `sha256`
    /// * `PolicyError::KeyAlgorithmMismatch` - `a` key algorithm differs from the key's
    /// * `PolicyError::ServiceNotAllowed` - key restricts services, `email` not listed
    /// * `PolicyError::UnsupportedCanonicalization` - bad `c`
    /// * `PolicyError::InsecureBodyLength` - `l` present
    pub fn validate(
        &self,
        pending: PendingSignature,
        key: KeyQueryResult,
    ) -> Result<ValidatedSignature, PolicyError> {
        let algorithm = strip_whitespace(pending.tags.get("a").unwrap_or_default());
        let (key_algorithm, hash_name) = algorithm
            .split_once('-')
            .ok_or_else(|| PolicyError::MalformedAlgorithm(algorithm.clone()))?;

        if let Some(allowed) = &key.hash_algorithms {
            if !allowed.iter().any(|h| h == hash_name) {
                return Err(PolicyError::HashNotAllowedByKey(hash_name.to_owned()));
            }
        }

        let hash_algorithm = match hash_name {
            "sha1" => return Err(PolicyError::WeakHashAlgorithm(hash_name.to_owned())),
            "sha256" => HashAlgorithm::Sha256,
            other => return Err(PolicyError::UnsupportedHashAlgorithm(other.to_owned())),
        };

        if key_algorithm != key.key_algorithm {
            return Err(PolicyError::KeyAlgorithmMismatch {
                signature: key_algorithm.to_owned(),
                key: key.key_algorithm.clone(),
            });
        }

        if let Some(services) = &key.services {
            if !services.iter().any(|s| s == EMAIL_SERVICE) {
                return Err(PolicyError::ServiceNotAllowed);
            }
        }

        let canonicalization = CanonicalizationPair::parse(pending.tags.get("c"))?;

        if pending.tags.contains("l") {
            return Err(PolicyError::InsecureBodyLength);
        }

        Ok(ValidatedSignature {
            domain: pending.domain,
            selector: pending.selector,
            signed_headers: pending.signed_headers,
            key_algorithm: key_algorithm.to_owned(),
            hash_algorithm,
            canonicalization,
            key,
            tags: pending.tags,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
