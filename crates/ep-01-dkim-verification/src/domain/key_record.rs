//! # Key Record Parser
//!
//! Parses a published DKIM key record (`v=DKIM1; k=rsa; p=...`) into a
//! [`KeyQueryResult`].

use super::entities::KeyQueryResult;
use super::errors::ResolutionError;
use super::tags::{decode_base64, parse_header_params, parse_tag_list};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;

/// Smallest RSA modulus accepted unless configured otherwise.
pub const DEFAULT_MIN_RSA_BITS: usize = 1024;

/// Parse a key record.
///
/// # Errors
/// * `ResolutionError::MalformedKeyRecord` - bad tag list, missing `p`, bad base64
/// * `ResolutionError::IncompatibleKeyVersion` - `v` present and not `DKIM1`
/// * `ResolutionError::KeyRevoked` - `p` is empty
/// * `ResolutionError::UnsupportedKeyAlgorithm` - `k` is not `rsa`
/// * `ResolutionError::InvalidKey` - `p` is neither SPKI nor PKCS#1
/// * `ResolutionError::KeyTooShort` - modulus below `min_rsa_bits`
pub fn parse_key_record(
    record: &str,
    min_rsa_bits: usize,
) -> Result<KeyQueryResult, ResolutionError> {
    let params = parse_header_params(record)
        .map_err(|e| ResolutionError::MalformedKeyRecord(e.to_string()))?;

    if let Some(version) = params.get("v") {
        if version != "DKIM1" {
            return Err(ResolutionError::IncompatibleKeyVersion(version.to_owned()));
        }
    }

    let encoded = params
        .get("p")
        .ok_or_else(|| ResolutionError::MalformedKeyRecord("missing public key data".into()))?;
    let der = decode_base64("p", encoded)
        .map_err(|e| ResolutionError::MalformedKeyRecord(e.to_string()))?;
    if der.is_empty() {
        return Err(ResolutionError::KeyRevoked);
    }

    let key_algorithm = params.get("k").unwrap_or("rsa").to_owned();
    if key_algorithm != "rsa" {
        return Err(ResolutionError::UnsupportedKeyAlgorithm(key_algorithm));
    }

    let key = parse_rsa_key(&der)?;
    let bits = key.n().bits();
    if bits < min_rsa_bits {
        return Err(ResolutionError::KeyTooShort {
            bits,
            min: min_rsa_bits,
        });
    }

    let services = params
        .get("s")
        .map(parse_tag_list)
        .filter(|services| !services.iter().any(|s| s == "*"));

    Ok(KeyQueryResult {
        key,
        key_algorithm,
        hash_algorithms: params.get("h").map(parse_tag_list),
        services,
        flags: params.get("t").map(parse_tag_list).unwrap_or_default(),
        notes: params.get("n").map(str::to_owned),
    })
}

/// SubjectPublicKeyInfo first, then a bare PKCS#1 RSAPublicKey.
fn parse_rsa_key(der: &[u8]) -> Result<RsaPublicKey, ResolutionError> {
    RsaPublicKey::from_public_key_der(der).or_else(|spki_err| {
        RsaPublicKey::from_pkcs1_der(der).map_err(|pkcs1_err| {
            ResolutionError::InvalidKey(format!(
                "not SubjectPublicKeyInfo ({spki_err}) nor PKCS#1 ({pkcs1_err})"
            ))
        })
    })
}

// =============================================================================
// TESTS
// =============================================================================
