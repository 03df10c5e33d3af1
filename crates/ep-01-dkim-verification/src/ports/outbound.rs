//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define the key lookup capabilities this subsystem needs.
//! Transport, caching and timeouts belong to the implementations.

use crate::domain::entities::KeyQueryResult;
use crate::domain::errors::ResolutionError;

/// Resolves a verification key given the signature's query method list.
pub trait KeyResolution: Send + Sync {
    /// Resolve the key for `selector` at `domain`.
    ///
    /// The first method in `methods` that the implementation recognizes is
    /// used; its failure is final.
    ///
    /// # Errors
    /// * `ResolutionError::NoRecognizedMethod` - no listed method is known
    /// * any error returned by the chosen method
    fn resolve(
        &self,
        methods: &[String],
        domain: &str,
        selector: &str,
    ) -> Result<KeyQueryResult, ResolutionError>;
}

/// One key query method, such as `dns/txt`.
pub trait KeyQuery: Send + Sync {
    /// Fetch and parse the key for `selector` at `domain`.
    ///
    /// # Errors
    /// Lookup failure or an unusable key record.
    fn query(&self, domain: &str, selector: &str) -> Result<KeyQueryResult, ResolutionError>;
}

/// TXT record lookup, the transport behind `dns/txt`.
pub trait TxtLookup: Send + Sync {
    /// All TXT records at `name`, each with its character strings joined.
    ///
    /// An empty list means no records exist.
    ///
    /// # Errors
    /// * `ResolutionError::Lookup` - the lookup itself failed
    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolutionError>;
}
