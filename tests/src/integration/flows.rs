//! # Integration Test Flows
//!
//! Tests that ep-01-dkim-verification and ep-02-circuit-inputs work together:
//! a signed message goes in, both circuit input artifacts come out.
//!
//! ## Flows Tested:
//!
//! 1. **dns/txt resolution → pipeline**: key record fetched through a TXT transport
//! 2. **Pipeline → artifacts**: wire shape of both public-input records
//! 3. **Canonicalization modes**: simple and relaxed, tolerated and breaking edits
//! 4. **Rejections**: every terminal error surfaces with its reason code

#[cfg(test)]
mod tests {
    use crate::fixtures::{SignOptions, TestSigner, BODY, DOMAIN, HEADERS, SELECTOR};
    use ep_01_dkim_verification::{
        key_record_name, Canonicalization, CanonicalizationPair, DkimVerificationService,
        DnsTxtKeyQuery, EmailVerificationApi, KeyResolver, PolicyError, ResolutionError,
        StaticKeyQuery, TxtLookup, VerificationError, VerifiedEmail, VerifierConfig,
        DNS_TXT_METHOD,
    };
    use ep_02_circuit_inputs::{padded_sha256, AddressBinding, CircuitConfig, DigestHalves};
    use rsa::traits::PublicKeyParts;
    use rsa::Pkcs1v15Sign;
    use serde_json::Value;
    use sha2::{Digest, Sha256};
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// One 2048-bit signer shared by every flow
    fn signer() -> &'static TestSigner {
        static SIGNER: OnceLock<TestSigner> = OnceLock::new();
        SIGNER.get_or_init(|| TestSigner::generate(2048).unwrap())
    }

    /// In-memory TXT records, recording every name queried
    #[derive(Default)]
    struct MockTxtLookup {
        records: HashMap<String, Vec<String>>,
        queries: Mutex<Vec<String>>,
    }

    impl TxtLookup for MockTxtLookup {
        fn lookup_txt(&self, name: &str) -> Result<Vec<String>, ResolutionError> {
            self.queries.lock().unwrap().push(name.to_string());
            Ok(self.records.get(name).cloned().unwrap_or_default())
        }
    }

    fn dns_service(record: String) -> DkimVerificationService<KeyResolver> {
        let mut lookup = MockTxtLookup::default();
        lookup
            .records
            .insert(key_record_name(DOMAIN, SELECTOR), vec![record]);
        let resolver = KeyResolver::new().with_method(DNS_TXT_METHOD, DnsTxtKeyQuery::new(lookup));
        DkimVerificationService::new(VerifierConfig::default(), resolver).unwrap()
    }

    fn static_service(config: VerifierConfig) -> DkimVerificationService<KeyResolver> {
        let keys =
            StaticKeyQuery::new().with_record(DOMAIN, SELECTOR, signer().key_record().unwrap());
        let resolver = KeyResolver::new().with_method(DNS_TXT_METHOD, keys);
        DkimVerificationService::new(config, resolver).unwrap()
    }

    fn relaxed() -> SignOptions {
        SignOptions {
            canonicalization: CanonicalizationPair {
                header: Canonicalization::Relaxed,
                body: Canonicalization::Relaxed,
            },
            ..SignOptions::default()
        }
    }

    fn rsa_verifies(verified: &VerifiedEmail) -> bool {
        verified
            .public_key
            .verify(
                Pkcs1v15Sign::new::<Sha256>(),
                &verified.header_hash,
                &verified.signature,
            )
            .is_ok()
    }

    fn decimal_strings(value: &Value) -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    // =============================================================================
    // INTEGRATION TESTS: DNS TXT → PIPELINE
    // =============================================================================

    /// Test: Key fetched over dns/txt verifies a relaxed/relaxed message
    #[test]
    fn test_dns_txt_flow_relaxed() {
        init_tracing();
        let message = signer().sign(HEADERS, BODY, &relaxed()).unwrap();
        let service = dns_service(signer().key_record().unwrap());

        let verified = service.verify(&message).unwrap();

        assert_eq!(verified.domain, DOMAIN);
        assert_eq!(verified.selector, SELECTOR);
        assert_eq!(verified.public_key, signer().public_key());
        assert_eq!(verified.canonical_body(), b"Hi Bob,\r\n\r\nNumbers attached.\r\n");
        assert!(rsa_verifies(&verified));
    }

    /// Test: simple/simple messages verify and keep the header bytes verbatim
    #[test]
    fn test_simple_flow() {
        let message = signer().sign(HEADERS, BODY, &SignOptions::default()).unwrap();
        let verified = static_service(VerifierConfig::default())
            .verify(&message)
            .unwrap();

        assert!(verified.canonical_header().starts_with(HEADERS.as_bytes()));
        assert_eq!(verified.canonical_body(), b"Hi Bob,\r\n\r\nNumbers attached.  \r\n");
        assert!(rsa_verifies(&verified));
    }

    /// Test: Revoked key record is reported as a resolution failure
    #[test]
    fn test_dns_txt_revoked_key() {
        let message = signer().sign(HEADERS, BODY, &relaxed()).unwrap();
        let service = dns_service("v=DKIM1; k=rsa; p=".to_string());
        assert_eq!(
            service.verify(&message).unwrap_err(),
            VerificationError::Resolution(ResolutionError::KeyRevoked)
        );
    }

    // =============================================================================
    // INTEGRATION TESTS: ARTIFACTS
    // =============================================================================

    /// Test: Signature inputs serialize as four arrays of decimal strings
    #[test]
    fn test_signature_inputs_wire_shape() {
        let message = signer().sign(HEADERS, BODY, &relaxed()).unwrap();
        let verified = static_service(VerifierConfig::default())
            .verify(&message)
            .unwrap();

        let json = serde_json::to_value(&verified.signature_inputs).unwrap();
        let object = json.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["exp", "hashed", "modulus", "sign"]);

        assert_eq!(decimal_strings(&json["hashed"]).len(), 4);
        assert_eq!(decimal_strings(&json["sign"]).len(), 32);
        assert_eq!(decimal_strings(&json["modulus"]).len(), 32);

        let exp = decimal_strings(&json["exp"]);
        assert_eq!(exp[0], "65537");
        assert!(exp[1..].iter().all(|l| l == "0"));

        // Least significant limb of the modulus first
        let n = verified.public_key.n().to_bytes_be();
        let low = u64::from_be_bytes(n[n.len() - 8..].try_into().unwrap());
        assert_eq!(decimal_strings(&json["modulus"])[0], low.to_string());
    }

    /// Test: Combined inputs carry bytes, halves and the padded address digest
    #[test]
    fn test_combined_inputs_wire_shape() {
        let message = signer().sign(HEADERS, BODY, &relaxed()).unwrap();
        let verified = static_service(VerifierConfig::default())
            .verify(&message)
            .unwrap();

        let json = serde_json::to_value(&verified.combined_inputs).unwrap();
        let object = json.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["body", "bodyHash", "gmailHash", "header", "headerHash"]);

        let header: Vec<u8> = decimal_strings(&json["header"])
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(header, verified.canonical_header());

        let body: Vec<u8> = decimal_strings(&json["body"])
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(body, verified.canonical_body());

        let header_hash: [u8; 32] = Sha256::digest(&header).into();
        let halves = DigestHalves::split(&header_hash);
        assert_eq!(
            decimal_strings(&json["headerHash"]),
            halves.to_decimal_strings().to_vec()
        );
        assert_eq!(
            u128::from_be_bytes(header_hash[..16].try_into().unwrap()).to_string(),
            decimal_strings(&json["headerHash"])[0]
        );

        let body_hash: [u8; 32] = Sha256::digest(&body).into();
        assert_eq!(
            decimal_strings(&json["bodyHash"]),
            DigestHalves::split(&body_hash).to_decimal_strings().to_vec()
        );

        assert_eq!(verified.signer.as_bytes(), b"alice@example.com");
        let address_hash = padded_sha256(b"alice@example.com", 32).unwrap();
        assert_eq!(
            decimal_strings(&json["gmailHash"]),
            DigestHalves::split(&address_hash).to_decimal_strings().to_vec()
        );
    }

    // =============================================================================
    // INTEGRATION TESTS: CANONICALIZATION MODES
    // =============================================================================

    /// Test: Relaxed tolerates header whitespace and case changes, simple does not
    #[test]
    fn test_header_reformatting() {
        let reformat = |message: Vec<u8>| {
            String::from_utf8(message)
                .unwrap()
                .replace("Subject: Quarterly report", "SUBJECT:   Quarterly \r\n report")
        };

        let relaxed_message = reformat(signer().sign(HEADERS, BODY, &relaxed()).unwrap());
        let verified = static_service(VerifierConfig::default())
            .verify(relaxed_message.as_bytes())
            .unwrap();
        assert!(rsa_verifies(&verified));

        let simple_message =
            reformat(signer().sign(HEADERS, BODY, &SignOptions::default()).unwrap());
        let verified = static_service(VerifierConfig::default())
            .verify(simple_message.as_bytes())
            .unwrap();
        assert!(!rsa_verifies(&verified));
    }

    /// Test: simple/simple keeps a folded From field, and its address is still found
    #[test]
    fn test_simple_flow_folded_from() {
        let folded = HEADERS.replace(
            "From: Alice Example <alice@example.com>",
            "From: \"Alice Example\"\r\n <alice@example.com>",
        );
        let spaced = HEADERS.replace("From:", "From :");

        for headers in [folded, spaced] {
            let message = signer()
                .sign(&headers, BODY, &SignOptions::default())
                .unwrap();
            let verified = static_service(VerifierConfig::default())
                .verify(&message)
                .unwrap();
            assert!(verified.canonical_header().starts_with(b"From"));
            assert_eq!(verified.signer.as_bytes(), b"alice@example.com");
            assert!(rsa_verifies(&verified));
        }
    }

    /// Test: A header signed twice covers two instances, bottom-up
    #[test]
    fn test_repeated_signed_header() {
        let headers = format!("{HEADERS}Received: by relay-1\r\nReceived: by relay-2\r\n");
        let mut options = relaxed();
        options.signed_headers = ["from", "received", "received", "received"]
            .into_iter()
            .map(String::from)
            .collect();

        let message = signer().sign(&headers, BODY, &options).unwrap();
        let verified = static_service(VerifierConfig::default())
            .verify(&message)
            .unwrap();
        assert!(rsa_verifies(&verified));
        assert!(verified
            .canonical_header()
            .starts_with(b"from:Alice Example <alice@example.com>\r\nreceived:by relay-2\r\nreceived:by relay-1\r\n"));
    }

    /// Test: Address binding decides which `from:` token is used
    #[test]
    fn test_address_binding_modes() {
        let headers = format!("X-Forwarded-From: Mallory <m@evil.test>\r\n{HEADERS}");
        let mut options = relaxed();
        options.signed_headers = ["x-forwarded-from", "from"]
            .into_iter()
            .map(String::from)
            .collect();
        let message = signer().sign(&headers, BODY, &options).unwrap();

        let verified = static_service(VerifierConfig::default())
            .verify(&message)
            .unwrap();
        assert_eq!(verified.signer.as_bytes(), b"alice@example.com");

        let legacy = VerifierConfig::default().with_circuit(CircuitConfig {
            address_binding: AddressBinding::FirstToken,
            ..CircuitConfig::default()
        });
        let verified = static_service(legacy).verify(&message).unwrap();
        assert_eq!(verified.signer.as_bytes(), b"m@evil.test");
    }

    // =============================================================================
    // INTEGRATION TESTS: REJECTIONS
    // =============================================================================

    /// Test: Body length tag is rejected
    #[test]
    fn test_body_length_tag_rejected() {
        let mut options = relaxed();
        options.extra_tags.push("l=10".to_string());
        let message = signer().sign(HEADERS, BODY, &options).unwrap();

        let err = static_service(VerifierConfig::default())
            .verify(&message)
            .unwrap_err();
        assert_eq!(err, VerificationError::Policy(PolicyError::InsecureBodyLength));
        assert_eq!(err.reason_code(), "policy.insecure_body_length");
    }

    /// Test: Appending to the body breaks the body hash
    #[test]
    fn test_appended_body_rejected() {
        let mut message = signer().sign(HEADERS, BODY, &relaxed()).unwrap();
        message.extend_from_slice(b"P.S. wire the funds\r\n");
        let err = static_service(VerifierConfig::default())
            .verify(&message)
            .unwrap_err();
        assert_eq!(err, VerificationError::BodyHashMismatch);
    }

    /// Test: A signer key wider than the RSA limbs cannot be encoded
    #[test]
    fn test_oversized_key_rejected_at_encoding() {
        let narrow = VerifierConfig::default().with_circuit(CircuitConfig {
            rsa_limbs: 16,
            ..CircuitConfig::default()
        });
        let message = signer().sign(HEADERS, BODY, &relaxed()).unwrap();
        let err = static_service(narrow).verify(&message).unwrap_err();
        assert_eq!(err.reason_code(), "encoding.limb_overflow");
    }
}
