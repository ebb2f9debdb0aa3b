//! Declared signature algorithms.

use crate::domain::errors::CallbackError;
use std::fmt;

/// Values accepted in the `algorithm` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    RsaSha256,
    Ed25519,
    /// Algorithm is implied by the key; also the value used when absent
    Hs2019,
}

impl SignatureAlgorithm {
    pub fn parse(value: Option<&str>) -> Result<Self, CallbackError> {
        match value {
            None => Ok(SignatureAlgorithm::Hs2019),
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "rsa-sha256" => Ok(SignatureAlgorithm::RsaSha256),
                "ed25519" => Ok(SignatureAlgorithm::Ed25519),
                "hs2019" => Ok(SignatureAlgorithm::Hs2019),
                other => Err(CallbackError::UnsupportedAlgorithm(other.to_string())),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaSha256 => "rsa-sha256",
            SignatureAlgorithm::Ed25519 => "ed25519",
            SignatureAlgorithm::Hs2019 => "hs2019",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithms() {
        assert_eq!(SignatureAlgorithm::parse(None), Ok(SignatureAlgorithm::Hs2019));
        assert_eq!(
            SignatureAlgorithm::parse(Some("RSA-SHA256")),
            Ok(SignatureAlgorithm::RsaSha256)
        );
        assert_eq!(
            SignatureAlgorithm::parse(Some("hmac-sha256")),
            Err(CallbackError::UnsupportedAlgorithm("hmac-sha256".into()))
        );
    }
}
