//! Parsing of the `Signature` header parameters.
//!
//! Accepted forms:
//!
//! ```text
//! Signature: keyId="k1",algorithm="rsa-sha256",headers="(request-target) date",signature="..."
//! Authorization: Signature keyId="k1",...
//! ```

use crate::domain::envelope::CallbackEnvelope;
use crate::domain::errors::CallbackError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Signed headers assumed when the `headers` parameter is omitted.
pub const DEFAULT_SIGNED_HEADERS: &str = "date";

/// Parameters of one HTTP signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParams {
    pub key_id: String,
    pub algorithm: Option<String>,
    /// Lower-cased signed header names, in signing order
    pub headers: Vec<String>,
    pub signature: Vec<u8>,
    pub created: Option<i64>,
    pub expires: Option<i64>,
}

impl SignatureParams {
    /// Locate and parse the signature carried by `envelope`.
    ///
    /// `Signature` wins over `Authorization` when both are present.
    pub fn from_envelope(envelope: &CallbackEnvelope) -> Result<Self, CallbackError> {
        if let Some(raw) = envelope.header_values("signature").next() {
            return Self::parse(raw);
        }
        if let Some(auth) = envelope.header_values("authorization").next() {
            let auth = auth.trim_start();
            if let Some(scheme) = auth.get(..10) {
                if scheme.eq_ignore_ascii_case("signature ") {
                    return Self::parse(&auth[10..]);
                }
            }
        }
        Err(CallbackError::MalformedSignature(
            "no signature header".to_string(),
        ))
    }

    /// Parse the comma-separated `name="value"` list.
    pub fn parse(raw: &str) -> Result<Self, CallbackError> {
        let mut key_id = None;
        let mut algorithm = None;
        let mut headers = None;
        let mut signature = None;
        let mut created = None;
        let mut expires = None;

        for (name, value) in split_params(raw)? {
            match name.as_str() {
                "keyid" => key_id = Some(value),
                "algorithm" => algorithm = Some(value.to_ascii_lowercase()),
                "headers" => headers = Some(value),
                "signature" => signature = Some(value),
                "created" => created = Some(parse_timestamp("created", &value)?),
                "expires" => expires = Some(parse_timestamp("expires", &value)?),
                _ => {}
            }
        }

        let key_id = key_id
            .filter(|k| !k.is_empty())
            .ok_or_else(|| malformed("missing keyId"))?;
        let signature = signature.ok_or_else(|| malformed("missing signature"))?;
        let signature = STANDARD
            .decode(signature.trim())
            .map_err(|_| malformed("signature is not base64"))?;
        if signature.is_empty() {
            return Err(malformed("empty signature"));
        }

        let headers: Vec<String> = headers
            .as_deref()
            .unwrap_or(DEFAULT_SIGNED_HEADERS)
            .split_ascii_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        if headers.is_empty() {
            return Err(malformed("empty headers list"));
        }

        Ok(Self {
            key_id,
            algorithm,
            headers,
            signature,
            created,
            expires,
        })
    }

    pub fn signs(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }
}

fn malformed(detail: &str) -> CallbackError {
    CallbackError::MalformedSignature(detail.to_string())
}

fn parse_timestamp(name: &str, value: &str) -> Result<i64, CallbackError> {
    value
        .trim()
        .parse()
        .map_err(|_| malformed(&format!("{name} is not an integer")))
}

/// Split into `(lower-cased name, value)` pairs. Quoted values may contain
/// commas; unquoted values end at the next comma.
fn split_params(raw: &str) -> Result<Vec<(String, String)>, CallbackError> {
    let mut params = Vec::new();
    let mut rest = raw.trim();

    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(|| malformed("parameter without value"))?;
        let name = rest[..eq].trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(malformed("empty parameter name"));
        }
        rest = rest[eq + 1..].trim_start();

        let value;
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').ok_or_else(|| malformed("unterminated quote"))?;
            value = quoted[..end].to_string();
            rest = quoted[end + 1..].trim_start();
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            value = rest[..end].trim().to_string();
            rest = &rest[end..];
        }

        params.push((name, value));

        rest = match rest.strip_prefix(',') {
            Some(next) => next.trim_start(),
            None if rest.is_empty() => rest,
            None => return Err(malformed("expected ',' between parameters")),
        };
    }

    Ok(params)
}
