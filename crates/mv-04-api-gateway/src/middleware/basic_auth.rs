//! Optional HTTP Basic gate.
//!
//! Installed only when both username and password are configured. Callback
//! routes are exempt: the provider authenticates those with signatures.

use crate::domain::config::BasicAuthConfig;
use crate::domain::error::ApiError;
use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

const REALM_CHALLENGE: &str = "Basic realm=\"mobile-verify\", charset=\"UTF-8\"";

#[derive(Debug)]
struct Credentials {
    username: String,
    password: String,
    exempt_paths: Vec<String>,
}

/// Basic auth layer
#[derive(Clone)]
pub struct BasicAuthLayer {
    credentials: Option<Arc<Credentials>>,
}

impl BasicAuthLayer {
    /// Gate everything except `exempt_paths`. A half-configured or empty
    /// config yields a pass-through layer.
    pub fn new(config: &BasicAuthConfig, exempt_paths: &[&str]) -> Self {
        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some(Arc::new(Credentials {
                username: username.clone(),
                password: password.clone(),
                exempt_paths: exempt_paths.iter().map(|p| p.to_string()).collect(),
            })),
            _ => None,
        };
        Self { credentials }
    }
}

impl<S> Layer<S> for BasicAuthLayer {
    type Service = BasicAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BasicAuthService {
            inner,
            credentials: self.credentials.clone(),
        }
    }
}

/// Basic auth service
#[derive(Clone)]
pub struct BasicAuthService<S> {
    inner: S,
    credentials: Option<Arc<Credentials>>,
}

impl<S> Service<Request<Body>> for BasicAuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        let allowed = match &self.credentials {
            None => true,
            Some(credentials) => {
                credentials
                    .exempt_paths
                    .iter()
                    .any(|p| p == req.uri().path())
                    || is_authorized(&req, credentials)
            }
        };

        Box::pin(async move {
            if !allowed {
                warn!(path = %req.uri().path(), "Basic auth rejected request");
                return Ok(unauthorized_response());
            }
            inner.call(req).await
        })
    }
}

fn is_authorized<B>(req: &Request<B>, credentials: &Credentials) -> bool {
    let Some(encoded) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
    else {
        return false;
    };

    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    let Some((username, password)) = decoded.split_once(':') else {
        return false;
    };

    // Both halves always compared
    let user_ok = constant_time_compare(username, &credentials.username);
    let pass_ok = constant_time_compare(password, &credentials.password);
    user_ok & pass_ok
}

fn unauthorized_response() -> Response {
    let mut response = ApiError::unauthorized().into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(REALM_CHALLENGE),
    );
    response
}

/// Constant-time string comparison.
///
/// Both inputs are padded to the longer length with different fill bytes,
/// so unequal lengths never match and the loop length leaks only the max.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let config = BasicAuthConfig {
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        };
        Router::new()
            .route("/my-ip", get(|| async { "ok" }))
            .route("/callback", post(|| async { "ok" }))
            .layer(BasicAuthLayer::new(&config, &["/callback"]))
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret", "secret"));
        assert!(!constant_time_compare("secret", "secreT"));
        assert!(!constant_time_compare("secret", "secret2"));
        assert!(!constant_time_compare("", "x"));
        assert!(constant_time_compare("", ""));
    }

    #[tokio::test]
    async fn test_missing_credentials_challenged() {
        let response = app()
            .oneshot(Request::builder().uri("/my-ip").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("Basic realm="));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/my-ip")
                    .header(header::AUTHORIZATION, basic("admin", "wrong"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_credentials_pass() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/my-ip")
                    .header(header::AUTHORIZATION, basic("admin", "hunter2"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_exempt_path_skips_gate() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/callback")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unconfigured_is_pass_through() {
        let app = Router::new()
            .route("/my-ip", get(|| async { "ok" }))
            .layer(BasicAuthLayer::new(&BasicAuthConfig::default(), &[]));
        let response = app
            .oneshot(Request::builder().uri("/my-ip").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
