//! # Verifier Configuration
//!
//! Pipeline and key query settings. Every struct has a usable `Default` and a
//! `validate()` that hosts should call after loading.

use crate::domain::key_record::DEFAULT_MIN_RSA_BITS;
use ep_02_circuit_inputs::{CircuitConfig, CircuitConfigError};
use serde::Deserialize;
use thiserror::Error;

/// Built-in key query method name.
pub const DNS_TXT_METHOD: &str = "dns/txt";

/// What to do when a message carries more than one signature field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipleSignaturePolicy {
    /// Fail with `MultipleSignatures`
    #[default]
    Reject,
    /// Verify the topmost signature field only
    UseFirst,
}

/// Verification pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Header field carrying the signature
    pub signature_field: String,
    /// Key query method used when the signature has no `q` tag
    pub default_query_method: String,
    /// Handling of messages with several signature fields
    pub multiple_signatures: MultipleSignaturePolicy,
    /// Shape of the produced circuit inputs
    pub circuit: CircuitConfig,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            signature_field: "DKIM-Signature".to_string(),
            default_query_method: DNS_TXT_METHOD.to_string(),
            multiple_signatures: MultipleSignaturePolicy::Reject,
            circuit: CircuitConfig::default(),
        }
    }
}

impl VerifierConfig {
    /// Validate all settings, including the circuit shape.
    ///
    /// # Errors
    /// * `ConfigError::EmptySignatureField` - no signature field name
    /// * `ConfigError::InvalidFieldName` - name contains `:` or whitespace
    /// * `ConfigError::EmptyQueryMethod` - no default query method
    /// * `ConfigError::Circuit` - invalid circuit shape
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signature_field.is_empty() {
            return Err(ConfigError::EmptySignatureField);
        }
        if self
            .signature_field
            .chars()
            .any(|c| c == ':' || c.is_whitespace())
        {
            return Err(ConfigError::InvalidFieldName(self.signature_field.clone()));
        }
        if self.default_query_method.trim().is_empty() {
            return Err(ConfigError::EmptyQueryMethod);
        }
        self.circuit.validate()?;
        Ok(())
    }

    /// Builder-style method to set the multiple signature policy
    pub fn with_multiple_signatures(mut self, policy: MultipleSignaturePolicy) -> Self {
        self.multiple_signatures = policy;
        self
    }

    /// Builder-style method to set the circuit shape
    pub fn with_circuit(mut self, circuit: CircuitConfig) -> Self {
        self.circuit = circuit;
        self
    }
}

/// Key query adapter configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyQueryConfig {
    /// Shortest RSA modulus accepted, in bits
    pub min_rsa_bits: usize,
}

impl Default for KeyQueryConfig {
    fn default() -> Self {
        Self {
            min_rsa_bits: DEFAULT_MIN_RSA_BITS,
        }
    }
}

impl KeyQueryConfig {
    /// Validate the key settings.
    ///
    /// # Errors
    /// * `ConfigError::MinKeyBitsTooLow` - below 512 bits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rsa_bits < 512 {
            return Err(ConfigError::MinKeyBitsTooLow(self.min_rsa_bits));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Signature field name is empty
    #[error("Signature field name must not be empty")]
    EmptySignatureField,

    /// Signature field name is not a valid header name
    #[error("Invalid signature field name: {0:?}")]
    InvalidFieldName(String),

    /// Default key query method is empty
    #[error("Default key query method must not be empty")]
    EmptyQueryMethod,

    /// Minimum RSA modulus is unreasonably small
    #[error("Minimum RSA key size {0} is below 512 bits")]
    MinKeyBitsTooLow(usize),

    /// Circuit shape is invalid
    #[error("Invalid circuit configuration: {0}")]
    Circuit(#[from] CircuitConfigError),
}
