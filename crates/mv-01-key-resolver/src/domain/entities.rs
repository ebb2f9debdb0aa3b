//! # Key Entities
//!
//! A JWK Set as published by the provider, and the typed key material the
//! verifier consumes.

use crate::domain::errors::KeyResolutionError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One entry of a JSON Web Key Set.
///
/// Only the members needed for RSA and OKP signature keys are modelled;
/// anything else in the document is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
}

/// A JSON Web Key Set document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    #[serde(default)]
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Convert every usable signature key into a map keyed by `kid`.
    ///
    /// Keys without a `kid`, keys marked for encryption, and keys whose
    /// material does not decode are skipped and logged.
    pub fn signing_keys(&self) -> HashMap<String, Arc<SigningKey>> {
        let mut keys = HashMap::with_capacity(self.keys.len());
        for jwk in &self.keys {
            if jwk.kid.is_none() {
                tracing::debug!(kty = %jwk.kty, "skipping JWK without kid");
                continue;
            }
            if matches!(jwk.key_use.as_deref(), Some(u) if u != "sig") {
                tracing::debug!(kid = ?jwk.kid, "skipping non-signature JWK");
                continue;
            }
            match SigningKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(key.key_id.clone(), Arc::new(key));
                }
                Err(e) => tracing::warn!(error = %e, "skipping unusable JWK"),
            }
        }
        keys
    }
}

/// Public key bytes, tagged by key family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// RSA modulus and exponent, big-endian
    Rsa { n: Vec<u8>, e: Vec<u8> },
    /// Ed25519 public point
    Ed25519 { public: [u8; 32] },
}

impl KeyMaterial {
    pub fn key_type(&self) -> &'static str {
        match self {
            KeyMaterial::Rsa { .. } => "RSA",
            KeyMaterial::Ed25519 { .. } => "OKP/Ed25519",
        }
    }
}

/// A public key published by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    pub key_id: String,
    /// JWK `alg`, if the publisher pinned one
    pub algorithm: Option<String>,
    pub material: KeyMaterial,
}

impl SigningKey {
    /// Build a key from a JWK.
    ///
    /// # Errors
    /// * `KeyResolutionError::UnsupportedKey` - missing `kid`, unknown `kty`
    ///   or curve, or members that are not valid base64url
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, KeyResolutionError> {
        let kid = jwk.kid.clone().ok_or_else(|| KeyResolutionError::UnsupportedKey {
            kid: String::new(),
            reason: "missing kid".to_string(),
        })?;
        let unsupported = |reason: &str| KeyResolutionError::UnsupportedKey {
            kid: kid.clone(),
            reason: reason.to_string(),
        };

        let material = match jwk.kty.as_str() {
            "RSA" => {
                let n = decode_member(jwk.n.as_deref()).ok_or_else(|| unsupported("bad n"))?;
                let e = decode_member(jwk.e.as_deref()).ok_or_else(|| unsupported("bad e"))?;
                KeyMaterial::Rsa { n, e }
            }
            "OKP" => {
                if jwk.crv.as_deref() != Some("Ed25519") {
                    return Err(unsupported("unsupported OKP curve"));
                }
                let x = decode_member(jwk.x.as_deref()).ok_or_else(|| unsupported("bad x"))?;
                let public: [u8; 32] = x
                    .try_into()
                    .map_err(|_| unsupported("Ed25519 key must be 32 bytes"))?;
                KeyMaterial::Ed25519 { public }
            }
            other => return Err(unsupported(&format!("unsupported kty {other}"))),
        };

        Ok(Self {
            key_id: kid,
            algorithm: jwk.alg.clone(),
            material,
        })
    }
}

/// Base64url, tolerating trailing padding some publishers emit.
fn decode_member(value: Option<&str>) -> Option<Vec<u8>> {
    let value = value?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    (!bytes.is_empty()).then_some(bytes)
}
