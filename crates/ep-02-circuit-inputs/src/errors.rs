//! Circuit input error types.

use thiserror::Error;

/// Errors raised while encoding values for the proving circuits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// Limb width outside the supported `1..=64` range
    #[error("Invalid limb width: {0} bits (expected 1..=64)")]
    InvalidLimbWidth(u32),

    /// Value needs more bits than the limb array can hold
    #[error("Value of {bits} bits does not fit in {capacity} bits of limbs")]
    LimbOverflow {
        /// Bits the value needs
        bits: usize,
        /// Bits the limbs provide
        capacity: usize,
    },

    /// Digest is not 32 bytes long
    #[error("Digest must be 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    /// No `<...>` address follows the `from:` token in the header bytes
    #[error("Signer address not found in canonical header")]
    AddressNotFound,

    /// Extracted address is longer than the padded address buffer
    #[error("Signer address is {len} bytes, padded buffer holds {max}")]
    AddressTooLong {
        /// Address length
        len: usize,
        /// Padded buffer length
        max: usize,
    },
}

impl EncodingError {
    /// Stable reason code for callers that surface failures.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidLimbWidth(_) => "encoding.invalid_limb_width",
            Self::LimbOverflow { .. } => "encoding.limb_overflow",
            Self::InvalidDigestLength(_) => "encoding.invalid_digest_length",
            Self::AddressNotFound => "encoding.address_not_found",
            Self::AddressTooLong { .. } => "encoding.address_too_long",
        }
    }
}
