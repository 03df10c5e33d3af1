//! # Adapters Module
//!
//! Key query implementations behind the outbound ports.

pub mod dns_txt;
pub mod key_resolver;
pub mod static_keys;
