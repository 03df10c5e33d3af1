//! # Test Fixtures
//!
//! A minimal DKIM signer for building messages the pipeline should accept.
//! It reuses the verifier's canonicalizers, so tests that pin canonical
//! bytes should spell those bytes out instead of relying on this module.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ep_01_dkim_verification::domain::header::{split_header, HeaderPicker};
use ep_01_dkim_verification::{canonicalize_body, CanonicalizationPair};
use rsa::pkcs8::EncodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// Signing domain used by the fixtures.
pub const DOMAIN: &str = "example.com";

/// Selector used by the fixtures.
pub const SELECTOR: &str = "sel1";

/// Header block used by most flows.
pub const HEADERS: &str = "From: Alice Example <alice@example.com>\r\n\
                           To: Bob <bob@example.org>\r\n\
                           Subject: Quarterly report\r\n\
                           Date: Mon, 2 Jun 2025 10:00:00 +0000\r\n";

/// Body used by most flows.
pub const BODY: &[u8] = b"Hi Bob,\r\n\r\nNumbers attached.  \r\n\r\n";

/// Fixture errors.
#[derive(Debug)]
pub enum FixtureError {
    /// Key generation or signing failed
    Rsa(rsa::Error),
    /// Public key encoding failed
    Spki(rsa::pkcs8::spki::Error),
    /// The header block does not parse
    Header(String),
}

impl From<rsa::Error> for FixtureError {
    fn from(e: rsa::Error) -> Self {
        Self::Rsa(e)
    }
}

impl From<rsa::pkcs8::spki::Error> for FixtureError {
    fn from(e: rsa::pkcs8::spki::Error) -> Self {
        Self::Spki(e)
    }
}

/// Options for one signature.
#[derive(Clone, Debug)]
pub struct SignOptions {
    /// Header and body canonicalization
    pub canonicalization: CanonicalizationPair,
    /// Names for the `h` tag
    pub signed_headers: Vec<String>,
    /// Extra tags appended before `bh`, e.g. `l=10`
    pub extra_tags: Vec<String>,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            canonicalization: CanonicalizationPair::default(),
            signed_headers: ["from", "to", "subject", "date"]
                .into_iter()
                .map(String::from)
                .collect(),
            extra_tags: Vec::new(),
        }
    }
}

/// RSA-SHA256 DKIM signer.
pub struct TestSigner {
    key: RsaPrivateKey,
}

impl TestSigner {
    /// Generate a signer with a fresh `bits`-bit key.
    pub fn generate(bits: usize) -> Result<Self, FixtureError> {
        Ok(Self {
            key: RsaPrivateKey::new(&mut rand::thread_rng(), bits)?,
        })
    }

    /// The public half.
    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }

    /// Key record to publish at `sel1._domainkey.example.com`.
    pub fn key_record(&self) -> Result<String, FixtureError> {
        let der = self.public_key().to_public_key_der()?;
        Ok(format!("v=DKIM1; k=rsa; p={}", STANDARD.encode(der.as_bytes())))
    }

    /// Sign `headers` (CRLF-terminated fields) and `body`, returning the
    /// full message with the signature field prepended.
    pub fn sign(
        &self,
        headers: &str,
        body: &[u8],
        options: &SignOptions,
    ) -> Result<Vec<u8>, FixtureError> {
        let c = options.canonicalization;
        let body_hash = Sha256::digest(canonicalize_body(c.body, body));

        let mut tags = vec![
            "v=1".to_string(),
            "a=rsa-sha256".to_string(),
            format!("c={}/{}", c.header.as_str(), c.body.as_str()),
            format!("d={DOMAIN}"),
            format!("s={SELECTOR}"),
            format!("h={}", options.signed_headers.join(":")),
        ];
        tags.extend(options.extra_tags.iter().cloned());
        tags.push(format!("bh={}", STANDARD.encode(body_hash)));
        tags.push("b=".to_string());
        let unsigned_field = format!("DKIM-Signature: {}", tags.join("; "));

        let block = format!("{headers}\r\n");
        let mut reader = block.as_bytes();
        let fields = split_header(&mut reader).map_err(|e| FixtureError::Header(e.to_string()))?;

        let mut signed = Vec::new();
        let mut picker = HeaderPicker::new(&fields);
        for name in &options.signed_headers {
            if let Some(field) = picker.pick(name) {
                signed.extend(c.header.canonicalize_header(&field.raw));
            }
        }
        let canonical_field = c.header.canonicalize_header(unsigned_field.as_bytes());
        signed.extend_from_slice(canonical_field.strip_suffix(b"\r\n").unwrap_or(&canonical_field));

        let signature = self
            .key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(&signed))?;

        let mut message = format!(
            "{unsigned_field}{}\r\n{headers}\r\n",
            STANDARD.encode(signature)
        )
        .into_bytes();
        message.extend_from_slice(body);
        Ok(message)
    }
}
