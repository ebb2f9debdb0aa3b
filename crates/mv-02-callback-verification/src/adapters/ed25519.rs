//! Ed25519 over JWK `x`.

use crate::domain::algorithm::SignatureAlgorithm;
use crate::ports::outbound::SignatureScheme;
use ed25519_dalek::{Signature, VerifyingKey};
use mv_01_key_resolver::KeyMaterial;

/// `ed25519`, and `hs2019` when the key is Ed25519.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Scheme;

impl SignatureScheme for Ed25519Scheme {
    fn name(&self) -> &'static str {
        "ed25519"
    }

    fn accepts(&self, algorithm: SignatureAlgorithm, key: &KeyMaterial) -> bool {
        matches!(key, KeyMaterial::Ed25519 { .. })
            && matches!(
                algorithm,
                SignatureAlgorithm::Ed25519 | SignatureAlgorithm::Hs2019
            )
    }

    fn verify(&self, message: &[u8], signature: &[u8], key: &KeyMaterial) -> bool {
        let KeyMaterial::Ed25519 { public } = key else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(public) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify_strict(message, &signature).is_ok()
    }
}
