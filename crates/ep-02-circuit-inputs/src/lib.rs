//! # EP-02: Circuit Inputs
//!
//! Numeric encoding of verified email material for the proving circuits.
//!
//! ## Components
//!
//! - `limbs` - Fixed-width, fixed-count limb encoding of big integers
//! - `digest` - 128-bit high/low split of 256-bit digests
//! - `address` - Signer address extraction from canonical headers
//! - `artifacts` - The signature and combined public-input records
//!
//! ## Conventions
//!
//! - Limbs are least significant first; overflow is an error, never a
//!   silent modular reduction
//! - Digest halves: bytes 0..16 are `high`, bytes 16..32 are `low`, both
//!   big-endian
//! - Every number is serialized as a decimal string

#![warn(missing_docs)]

pub mod address;
pub mod artifacts;
pub mod config;
pub mod digest;
pub mod errors;
pub mod limbs;

pub use address::SignerAddress;
pub use artifacts::{CombinedInputs, SignatureInputs};
pub use config::{AddressBinding, CircuitConfig, CircuitConfigError};
pub use digest::{padded_sha256, DigestHalves, DIGEST_LEN};
pub use errors::EncodingError;
pub use limbs::{value_to_limbs, LimbArray};
