//! # Digest Halves
//!
//! 256-bit digests do not fit a single BN254 field element, so circuits take
//! them as two 128-bit halves: bytes 0..16 are the high half and bytes 16..32
//! the low half, each read as a big-endian unsigned integer.

use crate::errors::EncodingError;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Length of every digest handled here (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// A 32-byte digest split into big-endian high and low 128-bit halves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DigestHalves {
    /// Bytes 0..16 as a big-endian integer
    pub high: u128,
    /// Bytes 16..32 as a big-endian integer
    pub low: u128,
}

impl DigestHalves {
    /// Split a fixed-size digest.
    pub fn split(digest: &[u8; DIGEST_LEN]) -> Self {
        let mut high = [0u8; 16];
        let mut low = [0u8; 16];
        high.copy_from_slice(&digest[..16]);
        low.copy_from_slice(&digest[16..]);
        Self {
            high: u128::from_be_bytes(high),
            low: u128::from_be_bytes(low),
        }
    }

    /// Split a digest held in a slice.
    ///
    /// # Errors
    /// * `EncodingError::InvalidDigestLength` - the slice is not 32 bytes
    pub fn from_slice(digest: &[u8]) -> Result<Self, EncodingError> {
        let digest: &[u8; DIGEST_LEN] = digest
            .try_into()
            .map_err(|_| EncodingError::InvalidDigestLength(digest.len()))?;
        Ok(Self::split(digest))
    }

    /// Concatenate the halves back into the original digest.
    pub fn to_bytes(&self) -> [u8; DIGEST_LEN] {
        let mut out = [0u8; DIGEST_LEN];
        out[..16].copy_from_slice(&self.high.to_be_bytes());
        out[16..].copy_from_slice(&self.low.to_be_bytes());
        out
    }

    /// `[high, low]` as decimal strings.
    pub fn to_decimal_strings(&self) -> [String; 2] {
        [self.high.to_string(), self.low.to_string()]
    }
}

impl Serialize for DigestHalves {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_decimal_strings().serialize(serializer)
    }
}

/// SHA-256 of `message` zero-padded (or required to fit) into `padded_len` bytes.
///
/// # Errors
/// * `EncodingError::AddressTooLong` - `message` is longer than `padded_len`
pub fn padded_sha256(message: &[u8], padded_len: usize) -> Result<[u8; DIGEST_LEN], EncodingError> {
    if message.len() > padded_len {
        return Err(EncodingError::AddressTooLong {
            len: message.len(),
            max: padded_len,
        });
    }
    let mut buffer = vec![0u8; padded_len];
    buffer[..message.len()].copy_from_slice(message);
    Ok(Sha256::digest(&buffer).into())
}

// =============================================================================
// TESTS
// =============================================================================
