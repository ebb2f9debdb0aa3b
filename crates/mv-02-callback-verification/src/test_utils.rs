//! Test utilities for callback verification.
//!
//! Deterministic signers that produce callbacks the way the provider does,
//! plus a fixed clock. Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use mv_02_callback_verification::test_utils::{FixedTimeSource, TestSigner};
//!
//! let signer = TestSigner::ed25519("key-1", 7);
//! let envelope = signer.signed_callback("/callback", br#"{"check_id":"c1"}"#, 1_700_000_000);
//! assert!(envelope.header("signature").is_some());
//! ```

use crate::domain::digest::digest_header_value;
use crate::domain::envelope::CallbackEnvelope;
use crate::domain::params::SignatureParams;
use crate::domain::signing_string;
use crate::ports::outbound::TimeSource;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ed25519_dalek::Signer;
use mv_01_key_resolver::{Jwk, KeyMaterial, SigningKey};
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};

/// 2048-bit RSA test key, PKCS#8 DER. Never use outside tests.
pub const RSA_TEST_KEY_PKCS8: &[u8] = include_bytes!("../../../tests/fixtures/rsa_test_key.pk8");

/// Modulus of [`RSA_TEST_KEY_PKCS8`], base64url.
pub const RSA_TEST_KEY_N: &str = "37sJd_vhZ9tDyi25rIXo-OEDxKs5D0IRXAwPrc2TDlMdId4tQd_egWjQ7AFOkiaJuBV5asEkU-7jP1HI8RB3J8I2ycDt0oGcp3UczSX7rRRG6HEKNSGg6dVME2XX5fupR3zYAX4tClgRG2Y_r6cPlxWcFMZ4lf8jSNw7oY6hOiRZ0nhrYJ5DtSR-Musa6o5dNVcw6JDbxFx1pL-TnSQKygMuW9kVaLlYdOchnhGqGythEseHzN6TvsDR2aK_iUKHdebJRyMrHsvhdlzuQCxaxnqm6eTK1iY2G4KvqVNCzDb9RuC0Zw2GKqgLjh_fd6CaiNwh2UZ18TQa7VAElPqDDw";

/// Public exponent of [`RSA_TEST_KEY_PKCS8`], base64url.
pub const RSA_TEST_KEY_E: &str = "AQAB";

/// Headers the provider signs on callbacks.
pub const CALLBACK_SIGNED_HEADERS: &[&str] = &["(request-target)", "host", "date", "digest"];

/// A time source that returns a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub i64);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> i64 {
        self.0
    }
}

enum SignerKey {
    Ed25519(ed25519_dalek::SigningKey),
    Rsa(RsaKeyPair),
}

/// Signs callbacks under a fixed key id.
pub struct TestSigner {
    key_id: String,
    key: SignerKey,
}

impl TestSigner {
    /// Ed25519 signer whose secret is 32 copies of `seed`.
    pub fn ed25519(key_id: &str, seed: u8) -> Self {
        Self {
            key_id: key_id.to_string(),
            key: SignerKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&[seed; 32])),
        }
    }

    /// RSA signer over the bundled test key.
    pub fn rsa(key_id: &str) -> Self {
        let pair = RsaKeyPair::from_pkcs8(RSA_TEST_KEY_PKCS8).expect("bundled RSA key parses");
        Self {
            key_id: key_id.to_string(),
            key: SignerKey::Rsa(pair),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn algorithm(&self) -> &'static str {
        match self.key {
            SignerKey::Ed25519(_) => "ed25519",
            SignerKey::Rsa(_) => "rsa-sha256",
        }
    }

    /// Public half as it would appear in the provider's JWKS.
    pub fn jwk(&self) -> Jwk {
        match &self.key {
            SignerKey::Ed25519(key) => Jwk {
                kty: "OKP".into(),
                kid: Some(self.key_id.clone()),
                key_use: Some("sig".into()),
                crv: Some("Ed25519".into()),
                x: Some(URL_SAFE_NO_PAD.encode(key.verifying_key().to_bytes())),
                ..Default::default()
            },
            SignerKey::Rsa(_) => Jwk {
                kty: "RSA".into(),
                kid: Some(self.key_id.clone()),
                key_use: Some("sig".into()),
                alg: Some("RS256".into()),
                n: Some(RSA_TEST_KEY_N.into()),
                e: Some(RSA_TEST_KEY_E.into()),
                ..Default::default()
            },
        }
    }

    pub fn key_material(&self) -> KeyMaterial {
        SigningKey::from_jwk(&self.jwk())
            .expect("test JWK is valid")
            .material
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match &self.key {
            SignerKey::Ed25519(key) => key.sign(message).to_bytes().to_vec(),
            SignerKey::Rsa(pair) => rsa_sign(pair, message),
        }
    }

    /// Sign `envelope` over `headers` and attach the `Signature` header.
    pub fn sign_envelope(&self, envelope: CallbackEnvelope, headers: &[&str]) -> CallbackEnvelope {
        let params = SignatureParams {
            key_id: self.key_id.clone(),
            algorithm: Some(self.algorithm().to_string()),
            headers: headers.iter().map(|h| h.to_ascii_lowercase()).collect(),
            signature: Vec::new(),
            created: None,
            expires: None,
        };
        let signing_string =
            signing_string::build(&envelope, &params).expect("signed headers present");
        let signature = STANDARD.encode(self.sign(signing_string.as_bytes()));
        let header = format!(
            r#"keyId="{}",algorithm="{}",headers="{}",signature="{}""#,
            self.key_id,
            self.algorithm(),
            params.headers.join(" "),
            signature
        );
        envelope.with_header("Signature", header)
    }

    /// A POST callback to `path` carrying `body`, dated `now`, signed the
    /// way the provider signs.
    pub fn signed_callback(&self, path: &str, body: &[u8], now: i64) -> CallbackEnvelope {
        let envelope = CallbackEnvelope::new("POST", path)
            .with_header("Host", "callbacks.example.com")
            .with_header("Date", http_date(now))
            .with_header("Content-Type", "application/json")
            .with_header("Digest", digest_header_value(body))
            .with_body(body.to_vec());
        self.sign_envelope(envelope, CALLBACK_SIGNED_HEADERS)
    }
}

/// Flip one bit of the signature carried by `envelope`, keeping it valid base64.
pub fn corrupt_signature(envelope: &mut CallbackEnvelope) {
    let header = envelope
        .headers
        .iter_mut()
        .find(|(name, _)| name.eq_ignore_ascii_case("signature"))
        .expect("envelope is signed");
    let params = SignatureParams::parse(&header.1).expect("signature parses");
    let mut bytes = params.signature.clone();
    bytes[0] ^= 0x01;
    let original = STANDARD.encode(&params.signature);
    header.1 = header.1.replace(&original, &STANDARD.encode(&bytes));
}

/// IMF-fixdate for `unix`.
pub fn http_date(unix: i64) -> String {
    chrono::DateTime::from_timestamp(unix, 0)
        .expect("timestamp in range")
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Key material of the bundled RSA test key.
pub fn rsa_test_key_material() -> KeyMaterial {
    TestSigner::rsa("rsa-test").key_material()
}

/// Sign with the bundled RSA test key.
pub fn sign_rsa_sha256(message: &[u8]) -> Vec<u8> {
    TestSigner::rsa("rsa-test").sign(message)
}

fn rsa_sign(pair: &RsaKeyPair, message: &[u8]) -> Vec<u8> {
    let mut signature = vec![0u8; pair.public().modulus_len()];
    pair.sign(&RSA_PKCS1_SHA256, &SystemRandom::new(), message, &mut signature)
        .expect("RSA signing succeeds");
    signature
}
