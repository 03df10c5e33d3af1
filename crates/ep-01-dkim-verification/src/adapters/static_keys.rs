//! # Static Key Query
//!
//! Key records supplied up front, for hosts that fetch keys themselves and
//! for deterministic tests.

use super::dns_txt::key_record_name;
use crate::config::{ConfigError, KeyQueryConfig};
use crate::domain::entities::KeyQueryResult;
use crate::domain::errors::ResolutionError;
use crate::domain::key_record::parse_key_record;
use crate::ports::outbound::KeyQuery;
use std::collections::HashMap;

/// Key query backed by an in-memory record table.
#[derive(Clone, Debug, Default)]
pub struct StaticKeyQuery {
    records: HashMap<(String, String), String>,
    config: KeyQueryConfig,
}

impl StaticKeyQuery {
    /// Create an empty table with default key settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with explicit key settings.
    ///
    /// # Errors
    /// * `ConfigError::MinKeyBitsTooLow` - the settings fail validation
    pub fn with_config(config: KeyQueryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            records: HashMap::new(),
            config,
        })
    }

    /// Publish `record` for `selector` at `domain`.
    pub fn insert(
        &mut self,
        domain: impl Into<String>,
        selector: impl Into<String>,
        record: impl Into<String>,
    ) {
        self.records
            .insert((domain.into(), selector.into()), record.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_record(
        mut self,
        domain: impl Into<String>,
        selector: impl Into<String>,
        record: impl Into<String>,
    ) -> Self {
        self.insert(domain, selector, record);
        self
    }
}

impl KeyQuery for StaticKeyQuery {
    fn query(&self, domain: &str, selector: &str) -> Result<KeyQueryResult, ResolutionError> {
        let record = self
            .records
            .get(&(domain.to_owned(), selector.to_owned()))
            .ok_or_else(|| ResolutionError::NoKey(key_record_name(domain, selector)))?;
        parse_key_record(record, self.config.min_rsa_bits)
    }
}
