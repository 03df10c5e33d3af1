//! # Domain Layer
//!
//! Message parsing, canonicalization, policy and hashing with no I/O.
//! This is the inner layer of the hexagonal architecture.

pub mod canonicalization;
pub mod entities;
pub mod errors;
pub mod extraction;
pub mod header;
pub mod key_record;
pub mod policy;
pub mod tags;
