//! # Circuit Input Configuration
//!
//! Shape parameters shared with the downstream circuits. Changing any of
//! these requires recompiling the circuits they feed.

use serde::Deserialize;
use thiserror::Error;

/// Where the signer address is looked for in the canonical header bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressBinding {
    /// Only a `from:` token that starts a header line, scanning that line only.
    #[default]
    FromField,
    /// The first `from:` token anywhere in the header bytes.
    ///
    /// Matches circuits that slice the header at the first occurrence.
    FirstToken,
}

/// Circuit input shape.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Bits per limb.
    pub limb_bits: u32,
    /// Limbs per 256-bit hash.
    pub hash_limbs: usize,
    /// Limbs per RSA signature, exponent and modulus.
    pub rsa_limbs: usize,
    /// Zero-padded buffer length the signer address is hashed in.
    pub address_padded_len: usize,
    /// How the signer address is located.
    pub address_binding: AddressBinding,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            limb_bits: 64,
            hash_limbs: 4,
            rsa_limbs: 32, // 2048-bit moduli
            address_padded_len: 32,
            address_binding: AddressBinding::FromField,
        }
    }
}

impl CircuitConfig {
    /// Check that the shape can hold the values it will be given.
    ///
    /// # Errors
    /// * `CircuitConfigError::InvalidLimbBits` - width outside `1..=64`
    /// * `CircuitConfigError::HashCapacity` - hash limbs hold fewer than 256 bits
    /// * `CircuitConfigError::ZeroAddressBuffer` - address buffer is empty
    pub fn validate(&self) -> Result<(), CircuitConfigError> {
        if self.limb_bits == 0 || self.limb_bits > 64 {
            return Err(CircuitConfigError::InvalidLimbBits(self.limb_bits));
        }
        let hash_capacity = self.limb_bits as usize * self.hash_limbs;
        if hash_capacity < 256 {
            return Err(CircuitConfigError::HashCapacity(hash_capacity));
        }
        if self.address_padded_len == 0 {
            return Err(CircuitConfigError::ZeroAddressBuffer);
        }
        Ok(())
    }

    /// Largest RSA modulus, in bits, the configured limbs can carry.
    pub fn rsa_capacity_bits(&self) -> usize {
        self.limb_bits as usize * self.rsa_limbs
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CircuitConfigError {
    /// Limb width outside `1..=64`
    #[error("Limb width {0} is outside 1..=64")]
    InvalidLimbBits(u32),

    /// Hash limbs cannot hold a SHA-256 digest
    #[error("Hash limbs hold {0} bits, need at least 256")]
    HashCapacity(usize),

    /// Address buffer length is zero
    #[error("Address padded length must be non-zero")]
    ZeroAddressBuffer,
}
