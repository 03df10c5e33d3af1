//! # EP-01: DKIM Verification
//!
//! Verifies an email's DKIM signature and prepares the circuit inputs for the
//! downstream zero-knowledge proof.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Parsing, canonicalization, policy, hashing; no I/O
//! - **Ports Layer** (`ports/`): Verification API and key lookup traits
//! - **Adapters Layer** (`adapters/`): `dns/txt` and static key queries, method registry
//! - **Service Layer** (`service.rs`): The verification pipeline
//!
//! ## Security Notes
//!
//! - **Body length tags**: Any `l=` tag rejects the signature, since it would
//!   leave appended content unsigned
//! - **SHA-1**: Rejected even when the key record allows it
//! - **Body hash**: Compared in constant time
//! - **RSA check**: Not performed here. The header hash, signature and key are
//!   handed to the signature circuit (or any RSA verifier) to check
//!
//! ## Example
//!
//! ```ignore
//! use ep_01_dkim_verification::{
//!     DkimVerificationService, EmailVerificationApi, KeyResolver, StaticKeyQuery,
//!     VerifierConfig, DNS_TXT_METHOD,
//! };
//!
//! let keys = StaticKeyQuery::new().with_record("example.com", "sel1", record);
//! let resolver = KeyResolver::new().with_method(DNS_TXT_METHOD, keys);
//! let service = DkimVerificationService::new(VerifierConfig::default(), resolver)?;
//! let verified = service.verify(&raw_message)?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::dns_txt::{key_record_name, DnsTxtKeyQuery};
pub use adapters::key_resolver::KeyResolver;
pub use adapters::static_keys::StaticKeyQuery;
pub use config::{
    ConfigError, KeyQueryConfig, MultipleSignaturePolicy, VerifierConfig, DNS_TXT_METHOD,
};
pub use domain::canonicalization::{
    canonicalize_body, BodyCanonicalizer, Canonicalization, CanonicalizationPair,
};
pub use domain::entities::{
    HashAlgorithm, HeaderField, KeyQueryResult, SignatureRecord, TagMap, VerifiedEmail,
};
pub use domain::errors::{PolicyError, ResolutionError, StructuralError, VerificationError};
pub use domain::key_record::{parse_key_record, DEFAULT_MIN_RSA_BITS};
pub use ports::inbound::EmailVerificationApi;
pub use ports::outbound::{KeyQuery, KeyResolution, TxtLookup};
pub use service::DkimVerificationService;
