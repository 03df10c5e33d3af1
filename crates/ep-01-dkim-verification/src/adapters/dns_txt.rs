//! # DNS TXT Key Query
//!
//! The `dns/txt` method: reads the key record published at
//! `<selector>._domainkey.<domain>` through a [`TxtLookup`] transport.

use crate::config::{ConfigError, KeyQueryConfig};
use crate::domain::entities::KeyQueryResult;
use crate::domain::errors::ResolutionError;
use crate::domain::key_record::parse_key_record;
use crate::ports::outbound::{KeyQuery, TxtLookup};
use tracing::debug;

/// Name of the TXT record holding the key for `selector` at `domain`.
pub fn key_record_name(domain: &str, selector: &str) -> String {
    format!("{selector}._domainkey.{domain}")
}

/// Key query over DNS TXT records.
#[derive(Debug)]
pub struct DnsTxtKeyQuery<L: TxtLookup> {
    lookup: L,
    config: KeyQueryConfig,
}

impl<L: TxtLookup> DnsTxtKeyQuery<L> {
    /// Create a query with default key settings.
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            config: KeyQueryConfig::default(),
        }
    }

    /// Create a query with explicit key settings.
    ///
    /// # Errors
    /// * `ConfigError::MinKeyBitsTooLow` - the settings fail validation
    pub fn with_config(lookup: L, config: KeyQueryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { lookup, config })
    }
}

impl<L: TxtLookup> KeyQuery for DnsTxtKeyQuery<L> {
    fn query(&self, domain: &str, selector: &str) -> Result<KeyQueryResult, ResolutionError> {
        let name = key_record_name(domain, selector);
        let records = self.lookup.lookup_txt(&name)?;
        debug!(name = %name, records = records.len(), "TXT lookup complete");

        match records.as_slice() {
            [] => Err(ResolutionError::NoKey(name)),
            [record] => parse_key_record(record, self.config.min_rsa_bits),
            _ => Err(ResolutionError::MultipleKeyRecords {
                name,
                count: records.len(),
            }),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
