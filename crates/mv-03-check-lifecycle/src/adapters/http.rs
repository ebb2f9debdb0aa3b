//! REST client for the verification provider.
//!
//! Authenticates with OAuth2 client credentials and caches the access token
//! until shortly before it expires.

use crate::domain::errors::ProviderError;
use crate::domain::model::ProviderCheck;
use crate::ports::outbound::ProviderClient;
use reqwest::{header, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::{CheckId, PhoneNumber};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tokens this close to expiry are treated as expired.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Connection settings for the provider.
#[derive(Debug, Clone)]
pub struct ProviderClientConfig {
    /// e.g. `https://eu.api.tru.id`
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// Whole-request timeout for every call
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ProviderClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eu.api.tru.id".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: ["phone_check", "subscriber_check", "sim_check", "coverage"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// `ProviderClient` over HTTPS.
pub struct HttpProviderClient {
    http: reqwest::Client,
    base_url: Url,
    config: ProviderClientConfig,
    token: Mutex<Option<CachedToken>>,
}

impl HttpProviderClient {
    /// # Errors
    /// * `ProviderError::Transport` - invalid base URL or HTTP client setup failure
    pub fn new(config: ProviderClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ProviderError::Transport(format!("invalid base url: {e}")))?;

        Ok(Self {
            http,
            base_url,
            config,
            token: Mutex::new(None),
        })
    }

    /// `base_url` joined with `segments`, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Transport("base url cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(token.access_token.clone());
            }
        }

        let url = self.endpoint(&["oauth2", "v1", "token"])?;
        let body = format!(
            "grant_type=client_credentials&scope={}",
            self.config.scopes.join("%20")
        );
        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Auth(format!("token endpoint returned {status}")));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("token response: {e}")))?;

        tracing::debug!(expires_in = token.expires_in, "provider access token obtained");
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(token.access_token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Revoked early; fetch a fresh one next time
            *self.token.lock().await = None;
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(http_error(status, response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn create_check(
        &self,
        product: &str,
        version: &str,
        phone_number: &PhoneNumber,
    ) -> Result<ProviderCheck, ProviderError> {
        let url = self.endpoint(&[product, version, "checks"])?;
        let request = self
            .http
            .post(url)
            .json(&json!({ "phone_number": phone_number.as_str() }));
        self.send_json(request).await
    }

    async fn get_check(
        &self,
        product: &str,
        version: &str,
        check_id: &CheckId,
    ) -> Result<ProviderCheck, ProviderError> {
        let url = self.endpoint(&[product, version, "checks", check_id.as_str()])?;
        self.send_json(self.http.get(url)).await
    }
}

#[async_trait::async_trait]
impl ProviderClient for HttpProviderClient {
    async fn create_phone_check(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<ProviderCheck, ProviderError> {
        self.create_check("phone_check", "v0.2", phone_number).await
    }

    async fn get_phone_check(&self, check_id: &CheckId) -> Result<ProviderCheck, ProviderError> {
        self.get_check("phone_check", "v0.2", check_id).await
    }

    async fn create_subscriber_check(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<ProviderCheck, ProviderError> {
        self.create_check("subscriber_check", "v0.2", phone_number)
            .await
    }

    async fn get_subscriber_check(
        &self,
        check_id: &CheckId,
    ) -> Result<ProviderCheck, ProviderError> {
        self.get_check("subscriber_check", "v0.2", check_id).await
    }

    async fn create_sim_check(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<ProviderCheck, ProviderError> {
        self.create_check("sim_check", "v0.1", phone_number).await
    }

    async fn get_country_coverage(&self, country_code: &str) -> Result<Value, ProviderError> {
        let url = self.endpoint(&["coverage", "v0.1", "countries", country_code])?;
        self.send_json(self.http.get(url)).await
    }

    async fn get_device_coverage(&self, ip_address: &str) -> Result<Value, ProviderError> {
        let url = self.endpoint(&["coverage", "v0.1", "device_ips", ip_address])?;
        let response = self.send(self.http.get(url)).await?;
        let status = response.status();

        if status.is_success() || status.is_client_error() {
            // Problem documents for non-mobile IPs are a normal answer here
            return response
                .json::<Value>()
                .await
                .map_err(|e| ProviderError::Decode(e.to_string()));
        }
        Err(http_error(status, response).await)
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Transport(e.to_string())
    }
}

async fn http_error(status: StatusCode, response: Response) -> ProviderError {
    ProviderError::Http {
        status: status.as_u16(),
        payload: response.json::<Value>().await.ok(),
    }
}
