//! HTTP key set source.

use crate::domain::entities::JwkSet;
use crate::domain::errors::KeyResolutionError;
use crate::ports::outbound::KeySetSource;
use std::time::Duration;

/// Fetches `{base_url}/.well-known/jwks.json` with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySetSource {
    /// # Errors
    /// * `KeyResolutionError::KeyFetch` - the HTTP client could not be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, KeyResolutionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeyResolutionError::KeyFetch(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing client, keeping its timeout and TLS settings.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: Self::jwks_url(base_url),
        }
    }

    pub fn jwks_url(base_url: &str) -> String {
        format!("{}/.well-known/jwks.json", base_url.trim_end_matches('/'))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch_key_set(&self) -> Result<JwkSet, KeyResolutionError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KeyResolutionError::KeyFetch(format!("timed out fetching {}", self.url))
                } else {
                    KeyResolutionError::KeyFetch(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyResolutionError::KeyFetch(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeyResolutionError::KeyFetch(format!("invalid key set: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwks_url_strips_trailing_slash() {
        assert_eq!(
            HttpKeySetSource::jwks_url("https://eu.api.tru.id/"),
            "https://eu.api.tru.id/.well-known/jwks.json"
        );
        let source =
            HttpKeySetSource::new("https://eu.api.tru.id", Duration::from_secs(1)).unwrap();
        assert_eq!(source.url(), "https://eu.api.tru.id/.well-known/jwks.json");
    }
}
