//! # Circuit Input Artifacts
//!
//! The two public-input records consumed by the proving circuits:
//!
//! - [`SignatureInputs`] feeds the RSA signature circuit
//! - [`CombinedInputs`] feeds the header/body/address hash circuit
//!
//! Both are write-once values. Persisting them is left to the caller.

use crate::address::SignerAddress;
use crate::config::CircuitConfig;
use crate::digest::{padded_sha256, DigestHalves, DIGEST_LEN};
use crate::errors::EncodingError;
use crate::limbs::{value_to_limbs, LimbArray};
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};
use tracing::debug;

// =============================================================================
// SIGNATURE VERIFICATION INPUTS
// =============================================================================

/// Limb-encoded inputs of the RSA signature circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignatureInputs {
    /// Header hash, `hash_limbs` limbs
    pub hashed: LimbArray,
    /// Signature integer, `rsa_limbs` limbs
    pub sign: LimbArray,
    /// Public exponent, `rsa_limbs` limbs
    pub exp: LimbArray,
    /// Public modulus, `rsa_limbs` limbs
    pub modulus: LimbArray,
}

impl SignatureInputs {
    /// Encode the header hash and RSA values. All integers are big-endian
    /// magnitudes.
    ///
    /// # Errors
    /// * `EncodingError::LimbOverflow` - a value is wider than its limb array
    pub fn build(
        config: &CircuitConfig,
        header_hash: &[u8],
        signature: &[u8],
        exponent: &[u8],
        modulus: &[u8],
    ) -> Result<Self, EncodingError> {
        let bits = config.limb_bits;
        Ok(Self {
            hashed: value_to_limbs(bits, config.hash_limbs, header_hash)?,
            sign: value_to_limbs(bits, config.rsa_limbs, signature)?,
            exp: value_to_limbs(bits, config.rsa_limbs, exponent)?,
            modulus: value_to_limbs(bits, config.rsa_limbs, modulus)?,
        })
    }
}

// =============================================================================
// COMBINED HASH INPUTS
// =============================================================================

/// Inputs of the combined header, body and signer-address circuit.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedInputs {
    /// Canonical header bytes exactly as hashed
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub header: Vec<u8>,
    /// SHA-256 of the zero-padded signer address
    pub gmail_hash: DigestHalves,
    /// Header hash
    pub header_hash: DigestHalves,
    /// Canonical body bytes exactly as hashed
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub body: Vec<u8>,
    /// Body hash asserted by the signature
    pub body_hash: DigestHalves,
}

impl CombinedInputs {
    /// Assemble the combined record and return it with the extracted signer.
    ///
    /// # Errors
    /// * `EncodingError::AddressNotFound` - no `<...>` address for `from:`
    /// * `EncodingError::AddressTooLong` - address exceeds the padded buffer
    /// * `EncodingError::InvalidDigestLength` - a hash is not 32 bytes
    pub fn build(
        config: &CircuitConfig,
        canonical_header: Vec<u8>,
        header_hash: &[u8],
        canonical_body: Vec<u8>,
        body_hash: &[u8],
    ) -> Result<(Self, SignerAddress), EncodingError> {
        let signer = SignerAddress::extract(&canonical_header, config.address_binding)?;
        let address_digest: [u8; DIGEST_LEN] =
            padded_sha256(signer.as_bytes(), config.address_padded_len)?;

        debug!(
            header_len = canonical_header.len(),
            body_len = canonical_body.len(),
            address_len = signer.as_bytes().len(),
            "Combined circuit inputs assembled"
        );

        let inputs = Self {
            header: canonical_header,
            gmail_hash: DigestHalves::split(&address_digest),
            header_hash: DigestHalves::from_slice(header_hash)?,
            body: canonical_body,
            body_hash: DigestHalves::from_slice(body_hash)?,
        };
        Ok((inputs, signer))
    }
}

// =============================================================================
// TESTS
// =============================================================================
