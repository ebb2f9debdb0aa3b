//! Body integrity via the `Digest` header (`SHA-256=<base64>`).

use crate::domain::envelope::CallbackEnvelope;
use crate::domain::errors::CallbackError;
use crate::domain::params::SignatureParams;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Check that the body is covered by the signature.
///
/// An empty body needs no digest. A non-empty body must carry a signed
/// SHA-256 digest that matches.
pub fn verify_body_digest(
    envelope: &CallbackEnvelope,
    params: &SignatureParams,
) -> Result<(), CallbackError> {
    if !params.signs("digest") {
        return if envelope.body.is_empty() {
            Ok(())
        } else {
            Err(CallbackError::MissingDigest)
        };
    }

    let header = envelope.header("digest").ok_or(CallbackError::MissingDigest)?;
    let claimed = header
        .split(',')
        .filter_map(|entry| entry.trim().split_once('='))
        .find(|(alg, _)| alg.trim().eq_ignore_ascii_case("sha-256"))
        .map(|(_, value)| value.trim())
        .ok_or(CallbackError::MissingDigest)?;
    let claimed = STANDARD
        .decode(claimed)
        .map_err(|_| CallbackError::DigestMismatch)?;

    let actual = Sha256::digest(&envelope.body);
    if claimed.len() == actual.len() && bool::from(claimed.as_slice().ct_eq(actual.as_slice())) {
        Ok(())
    } else {
        Err(CallbackError::DigestMismatch)
    }
}

/// Header value for `body`, as a signer would send it.
pub fn digest_header_value(body: &[u8]) -> String {
    format!("SHA-256={}", STANDARD.encode(Sha256::digest(body)))
}
