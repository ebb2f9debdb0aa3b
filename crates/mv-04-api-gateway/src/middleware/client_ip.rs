//! Caller address derivation.
//!
//! `X-Forwarded-For` is honoured only when the direct peer is a trusted
//! proxy; otherwise the socket address wins. The result is stored as a
//! [`ClientIp`] request extension for handlers.

use crate::domain::config::SecurityConfig;
use axum::{
    async_trait,
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, Request},
    response::Response,
};
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Real client address as derived by [`ClientIpLayer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ip) = parts.extensions.get::<ClientIp>() {
            return Ok(*ip);
        }
        // Layer not installed: fall back to the socket peer
        Ok(ClientIp(direct_peer(&parts.extensions)))
    }
}

/// Trusted proxy configuration
#[derive(Clone, Debug)]
pub struct TrustedProxyConfig {
    /// List of trusted proxy IPs
    pub trusted_proxies: Vec<IpAddr>,
    /// Trust local IPs (127.0.0.1, ::1)
    pub trust_localhost: bool,
    /// Trust private IPs (10.x.x.x, 192.168.x.x, 172.16-31.x.x)
    pub trust_private: bool,
    /// Number of trusted proxies in chain (for X-Forwarded-For)
    pub proxy_count: usize,
}

impl From<&SecurityConfig> for TrustedProxyConfig {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            trusted_proxies: config.trusted_proxies.clone(),
            trust_localhost: config.trust_localhost,
            trust_private: config.trust_private_ips,
            proxy_count: config.proxy_count,
        }
    }
}

/// Client IP layer
#[derive(Clone)]
pub struct ClientIpLayer {
    config: Arc<TrustedProxyConfig>,
}

impl ClientIpLayer {
    pub fn new(config: TrustedProxyConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for ClientIpLayer {
    type Service = ClientIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientIpService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Client IP service
#[derive(Clone)]
pub struct ClientIpService<S> {
    inner: S,
    config: Arc<TrustedProxyConfig>,
}

impl<S> Service<Request<Body>> for ClientIpService<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let direct_ip = direct_peer(req.extensions());
        let real_ip = determine_real_ip(req.headers(), direct_ip, &self.config);

        if !is_trusted_proxy(direct_ip, &self.config) {
            if let Some(forwarded) = req.headers().get("x-forwarded-for") {
                warn!(
                    direct_ip = %direct_ip,
                    forwarded = ?forwarded,
                    "Ignoring X-Forwarded-For from untrusted source"
                );
            }
        }

        req.extensions_mut().insert(ClientIp(real_ip));

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

fn direct_peer(extensions: &axum::http::Extensions) -> IpAddr {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Determine the real client IP based on trusted proxy configuration
fn determine_real_ip(headers: &HeaderMap, direct_ip: IpAddr, config: &TrustedProxyConfig) -> IpAddr {
    if !is_trusted_proxy(direct_ip, config) {
        return direct_ip;
    }

    let Some(value) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    else {
        return direct_ip;
    };

    // client, proxy1, proxy2: take the Nth from the right based on proxy_count
    let ips: Vec<&str> = value.split(',').map(str::trim).collect();
    let index = ips.len().saturating_sub(config.proxy_count.max(1));
    match ips.get(index).and_then(|s| s.parse::<IpAddr>().ok()) {
        Some(ip) => {
            debug!(forwarded = value, extracted_ip = %ip, "Extracted client IP from header");
            ip
        }
        None => direct_ip,
    }
}

/// Check if an IP is a trusted proxy
fn is_trusted_proxy(ip: IpAddr, config: &TrustedProxyConfig) -> bool {
    config.trusted_proxies.contains(&ip)
        || (config.trust_localhost && ip.is_loopback())
        || (config.trust_private && is_private_ip(ip))
}

/// Check if IP is in private range
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => ipv4.is_private() || ipv4.is_link_local(),
        IpAddr::V6(ipv6) => {
            // IPv6 unique local addresses (fc00::/7)
            let octets = ipv6.octets();
            (octets[0] & 0xfe) == 0xfc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrustedProxyConfig {
        TrustedProxyConfig::from(&SecurityConfig::default())
    }

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", value.parse().unwrap());
        headers
    }

    #[test]
    fn test_is_private_ip() {
        assert!(is_private_ip("10.0.0.1".parse().unwrap()));
        assert!(is_private_ip("192.168.1.1".parse().unwrap()));
        assert!(is_private_ip("fd00::1".parse().unwrap()));
        assert!(!is_private_ip("8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn test_trusted_localhost_uses_forwarded() {
        let ip = determine_real_ip(
            &forwarded("203.0.113.7"),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            &config(),
        );
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarded() {
        let peer: IpAddr = "198.51.100.20".parse().unwrap();
        let ip = determine_real_ip(&forwarded("203.0.113.7"), peer, &config());
        assert_eq!(ip, peer);
    }

    #[test]
    fn test_proxy_chain_picks_from_the_right() {
        let mut config = config();
        config.proxy_count = 2;
        let ip = determine_real_ip(
            &forwarded("1.1.1.1, 203.0.113.7, 10.0.0.2"),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            &config,
        );
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_garbage_forwarded_falls_back_to_peer() {
        let peer = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let ip = determine_real_ip(&forwarded("not-an-ip"), peer, &config());
        assert_eq!(ip, peer);
    }

    #[test]
    fn test_explicit_trusted_proxy() {
        let proxy: IpAddr = "198.51.100.20".parse().unwrap();
        let mut config = config();
        config.trusted_proxies.push(proxy);
        let ip = determine_real_ip(&forwarded("203.0.113.7"), proxy, &config);
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }
}
