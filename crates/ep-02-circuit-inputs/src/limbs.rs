//! # Limb Encoding
//!
//! Fixed-width, fixed-count positional encoding of big integers.
//!
//! A value `v` becomes `k` limbs of `n` bits each, least significant first:
//! `v == sum(limb[i] * 2^(n*i))`. Values that need more than `n * k` bits are
//! rejected instead of being reduced modulo `2^(n*k)`.

use crate::errors::EncodingError;
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};

/// Widest supported limb.
pub const MAX_LIMB_BITS: u32 = 64;

/// A big integer split into fixed-width limbs, least significant first.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LimbArray {
    #[serde_as(as = "Vec<DisplayFromStr>")]
    limbs: Vec<u64>,
    #[serde(skip)]
    bit_width: u32,
}

impl LimbArray {
    /// The limbs, least significant first.
    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    /// Width of every limb in bits.
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Number of limbs (including zero padding).
    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    /// True for a zero-count array.
    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    /// Each limb rendered as a decimal string.
    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.limbs.iter().map(u64::to_string).collect()
    }

    /// Reassemble the minimal big-endian magnitude of the encoded value.
    ///
    /// Zero reassembles to an empty vector.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let width = self.bit_width;
        let mut le = Vec::with_capacity(self.limbs.len() * width as usize / 8 + 1);
        let mut acc: u128 = 0;
        let mut acc_bits: u32 = 0;

        for &limb in &self.limbs {
            acc |= (limb as u128) << acc_bits;
            acc_bits += width;
            while acc_bits >= 8 {
                le.push(acc as u8);
                acc >>= 8;
                acc_bits -= 8;
            }
        }
        if acc_bits > 0 {
            le.push(acc as u8);
        }

        while le.last() == Some(&0) {
            le.pop();
        }
        le.reverse();
        le
    }
}

/// Encode a big-endian magnitude as `limb_count` limbs of `bit_width` bits.
///
/// # Errors
/// * `EncodingError::InvalidLimbWidth` - `bit_width` is 0 or above 64
/// * `EncodingError::LimbOverflow` - the value needs more than
///   `bit_width * limb_count` bits
pub fn value_to_limbs(
    bit_width: u32,
    limb_count: usize,
    value_be: &[u8],
) -> Result<LimbArray, EncodingError> {
    if bit_width == 0 || bit_width > MAX_LIMB_BITS {
        return Err(EncodingError::InvalidLimbWidth(bit_width));
    }

    let value_be = trim_leading_zeros(value_be);
    let bits = significant_bits(value_be);
    let capacity = bit_width as usize * limb_count;
    if bits > capacity {
        return Err(EncodingError::LimbOverflow { bits, capacity });
    }

    let mask: u128 = if bit_width == MAX_LIMB_BITS {
        u64::MAX as u128
    } else {
        (1u128 << bit_width) - 1
    };

    let mut limbs = vec![0u64; limb_count];
    let mut acc: u128 = 0;
    let mut acc_bits: u32 = 0;
    let mut index = 0;

    // Walk bytes from least significant; the overflow check bounds `acc_bits`.
    for &byte in value_be.iter().rev() {
        acc |= (byte as u128) << acc_bits;
        acc_bits += 8;
        while acc_bits >= bit_width && index < limb_count {
            limbs[index] = (acc & mask) as u64;
            acc >>= bit_width;
            acc_bits -= bit_width;
            index += 1;
        }
    }
    if acc != 0 && index < limb_count {
        limbs[index] = (acc & mask) as u64;
    }

    Ok(LimbArray { limbs, bit_width })
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Bit length of a big-endian magnitude without leading zero bytes.
fn significant_bits(trimmed_be: &[u8]) -> usize {
    match trimmed_be.first() {
        None => 0,
        Some(&top) => (trimmed_be.len() - 1) * 8 + (8 - top.leading_zeros() as usize),
    }
}

// =============================================================================
// TESTS
// =============================================================================
