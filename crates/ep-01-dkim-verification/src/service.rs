//! # DKIM Verification Service
//!
//! Application service layer that implements the `EmailVerificationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`EmailVerificationApi`)
//! - Uses the outbound port (`KeyResolution`) to obtain the signer's key
//! - Delegates parsing, policy and hashing to the domain layer
//! - Hands the results to the circuit input encoder
//!
//! ## Pipeline
//!
//! ```text
//! raw message → split header → locate signature → parse tags → precheck
//!     → resolve key → validate → decode bh/b → hash body → compare
//!     → hash header → encode circuit inputs
//! ```
//!
//! The first failure ends the run; nothing is produced for a rejected message.

use crate::config::{ConfigError, MultipleSignaturePolicy, VerifierConfig};
use crate::domain::entities::{SignatureRecord, VerifiedEmail};
use crate::domain::errors::VerificationError;
use crate::domain::extraction::{decode_asserted_values, hash_body, hash_header, verify_body_hash};
use crate::domain::header::{find_signatures, split_header};
use crate::domain::policy::PolicyValidator;
use crate::domain::tags::parse_header_params;
use crate::ports::inbound::EmailVerificationApi;
use crate::ports::outbound::KeyResolution;
use ep_02_circuit_inputs::{CombinedInputs, SignatureInputs};
use rsa::traits::PublicKeyParts;
use std::io::BufRead;
use tracing::{debug, info, warn};

/// DKIM Verification Service.
///
/// Verifies the single signature of a message and produces both circuit
/// input artifacts. Holds no per-message state, so one instance can serve
/// any number of messages.
pub struct DkimVerificationService<R: KeyResolution> {
    config: VerifierConfig,
    validator: PolicyValidator,
    resolver: R,
}

impl<R: KeyResolution> DkimVerificationService<R> {
    /// Create a new verification service.
    ///
    /// # Arguments
    /// * `config` - Pipeline settings, validated here
    /// * `resolver` - Key lookup for the signing domain
    ///
    /// # Errors
    /// * `ConfigError` - the configuration is invalid
    pub fn new(config: VerifierConfig, resolver: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            validator: PolicyValidator::new(config.default_query_method.clone()),
            config,
            resolver,
        })
    }

    /// Get the active configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify a message read from `reader`.
    ///
    /// The body is canonicalized and hashed while it is read.
    ///
    /// # Errors
    /// See [`VerificationError`]; the reason code is logged at `warn`.
    pub fn verify_reader<B: BufRead>(
        &self,
        reader: &mut B,
    ) -> Result<VerifiedEmail, VerificationError> {
        self.run(reader).inspect_err(|e| {
            warn!(reason = e.reason_code(), error = %e, "DKIM verification rejected");
        })
    }

    fn run<B: BufRead>(&self, reader: &mut B) -> Result<VerifiedEmail, VerificationError> {
        // 1. Split header fields; `reader` is left at the body
        let fields = split_header(reader)?;

        // 2. Locate the signature
        let records = find_signatures(&fields, &self.config.signature_field)?;
        let record = self.select_signature(records)?;
        debug!(index = record.index, fields = fields.len(), "Signature located");

        // 3. Tag checks that need no key
        let tags = parse_header_params(&record.value)?;
        let pending = self.validator.precheck(tags)?;

        // 4. Resolve the key
        let key =
            self.resolver
                .resolve(&pending.query_methods, &pending.domain, &pending.selector)?;
        debug!(
            domain = %pending.domain,
            selector = %pending.selector,
            bits = key.key.n().bits(),
            "Key resolved"
        );

        // 5. Remaining policy checks
        let signature = self.validator.validate(pending, key)?;
        let asserted = decode_asserted_values(&signature)?;

        // 6. Body hash, compared before any header hashing
        let body = hash_body(
            reader,
            signature.canonicalization.body,
            signature.hash_algorithm,
        )?;
        verify_body_hash(&body.digest, &asserted.body_hash)?;

        // 7. Header hash, signature field last
        let header = hash_header(&fields, &fields[record.index], &signature);

        // 8. Circuit inputs
        let public_key = signature.key.key;
        let signature_inputs = SignatureInputs::build(
            &self.config.circuit,
            &header.digest,
            &asserted.signature,
            &public_key.e().to_bytes_be(),
            &public_key.n().to_bytes_be(),
        )?;
        let (combined_inputs, signer) = CombinedInputs::build(
            &self.config.circuit,
            header.canonical,
            &header.digest,
            body.canonical,
            &asserted.body_hash,
        )?;

        info!(
            domain = %signature.domain,
            selector = %signature.selector,
            header = signature.canonicalization.header.as_str(),
            body = signature.canonicalization.body.as_str(),
            "Email verified, circuit inputs produced"
        );

        Ok(VerifiedEmail {
            domain: signature.domain,
            selector: signature.selector,
            canonicalization: signature.canonicalization,
            header_hash: header.digest,
            body_hash: asserted.body_hash,
            signature: asserted.signature,
            public_key,
            signer,
            signature_inputs,
            combined_inputs,
        })
    }

    fn select_signature(
        &self,
        mut records: Vec<SignatureRecord>,
    ) -> Result<SignatureRecord, VerificationError> {
        match (records.len(), self.config.multiple_signatures) {
            (0, _) => Err(VerificationError::NoSignature),
            (1, _) | (_, MultipleSignaturePolicy::UseFirst) => Ok(records.swap_remove(0)),
            (count, MultipleSignaturePolicy::Reject) => {
                Err(VerificationError::MultipleSignatures { count })
            }
        }
    }
}

impl<R: KeyResolution> EmailVerificationApi for DkimVerificationService<R> {
    fn verify(&self, raw_message: &[u8]) -> Result<VerifiedEmail, VerificationError> {
        let mut reader = raw_message;
        self.verify_reader(&mut reader)
    }
}

// =============================================================================
// TESTS
// =============================================================================
