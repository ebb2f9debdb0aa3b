//! RSASSA-PKCS1-v1_5 with SHA-256 over JWK `n`/`e`.

use crate::domain::algorithm::SignatureAlgorithm;
use crate::ports::outbound::SignatureScheme;
use mv_01_key_resolver::KeyMaterial;
use ring::signature::{RsaPublicKeyComponents, RSA_PKCS1_2048_8192_SHA256};

/// `rsa-sha256`, and `hs2019` when the key is RSA.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaSha256Scheme;

impl SignatureScheme for RsaSha256Scheme {
    fn name(&self) -> &'static str {
        "rsa-sha256"
    }

    fn accepts(&self, algorithm: SignatureAlgorithm, key: &KeyMaterial) -> bool {
        matches!(key, KeyMaterial::Rsa { .. })
            && matches!(
                algorithm,
                SignatureAlgorithm::RsaSha256 | SignatureAlgorithm::Hs2019
            )
    }

    fn verify(&self, message: &[u8], signature: &[u8], key: &KeyMaterial) -> bool {
        let KeyMaterial::Rsa { n, e } = key else {
            return false;
        };
        let public_key = RsaPublicKeyComponents {
            n: n.as_slice(),
            e: e.as_slice(),
        };
        public_key
            .verify(&RSA_PKCS1_2048_8192_SHA256, message, signature)
            .is_ok()
    }
}
