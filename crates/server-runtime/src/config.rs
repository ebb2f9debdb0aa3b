//! # Runtime Configuration
//!
//! Layering, lowest to highest precedence:
//!
//! 1. `GatewayConfig::default()`
//! 2. TOML file named by `MV_CONFIG`, if set
//! 3. Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MV_PORT` / `PORT` | `http.port` |
//! | `MV_API_BASE_URL` | `provider.base_url` |
//! | `MV_CLIENT_ID` | `provider.client_id` |
//! | `MV_CLIENT_SECRET` | `provider.client_secret` |
//! | `MV_BASIC_AUTH_USERNAME` | `basic_auth.username` |
//! | `MV_BASIC_AUTH_PASSWORD` | `basic_auth.password` |
//! | `MV_PUBLIC_DIR` | `static_files.dir` |

use mv_04_api_gateway::{ConfigError, GatewayConfig};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<GatewayConfig, RuntimeConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration with an injectable variable lookup.
pub fn load_config_from<F>(env: F) -> Result<GatewayConfig, RuntimeConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match env("MV_CONFIG").filter(|p| !p.trim().is_empty()) {
        Some(path) => {
            let path = PathBuf::from(path);
            let text = std::fs::read_to_string(&path).map_err(|source| {
                RuntimeConfigError::Read {
                    path: path.clone(),
                    source,
                }
            })?;
            let config = toml::from_str(&text).map_err(|source| RuntimeConfigError::Parse {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, &env);
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut GatewayConfig, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = env("MV_PORT").or_else(|| env("PORT")) {
        match port.trim().parse() {
            Ok(p) => config.http.port = p,
            Err(_) => warn!(value = %port, "Ignoring unparseable port"),
        }
    }
    if let Some(url) = env("MV_API_BASE_URL") {
        config.provider.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(id) = env("MV_CLIENT_ID") {
        config.provider.client_id = id;
    }
    if let Some(secret) = env("MV_CLIENT_SECRET") {
        config.provider.client_secret = secret;
    }
    if let Some(username) = env("MV_BASIC_AUTH_USERNAME").filter(|v| !v.is_empty()) {
        config.basic_auth.username = Some(username);
    }
    if let Some(password) = env("MV_BASIC_AUTH_PASSWORD").filter(|v| !v.is_empty()) {
        config.basic_auth.password = Some(password);
    }
    if let Some(dir) = env("MV_PUBLIC_DIR") {
        config.static_files.dir = PathBuf::from(dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load_config_from(env_of(&[])).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.provider.base_url, "https://eu.api.tru.id");
        assert!(!config.basic_auth.is_enabled());
    }

    #[test]
    fn test_environment_overrides() {
        let config = load_config_from(env_of(&[
            ("PORT", "4000"),
            ("MV_API_BASE_URL", "https://us.api.tru.id/"),
            ("MV_CLIENT_ID", "client"),
            ("MV_CLIENT_SECRET", "secret"),
            ("MV_BASIC_AUTH_USERNAME", "admin"),
            ("MV_BASIC_AUTH_PASSWORD", "hunter2"),
            ("MV_PUBLIC_DIR", "/srv/public"),
        ]))
        .unwrap();
        assert_eq!(config.http.port, 4000);
        assert_eq!(config.provider.base_url, "https://us.api.tru.id");
        assert_eq!(config.provider.client_id, "client");
        assert_eq!(config.provider.client_secret, "secret");
        assert!(config.basic_auth.is_enabled());
        assert_eq!(config.static_files.dir, PathBuf::from("/srv/public"));
    }

    #[test]
    fn test_mv_port_wins_over_port() {
        let config = load_config_from(env_of(&[("MV_PORT", "9000"), ("PORT", "4000")])).unwrap();
        assert_eq!(config.http.port, 9000);
    }

    #[test]
    fn test_half_basic_auth_is_invalid() {
        let result = load_config_from(env_of(&[("MV_BASIC_AUTH_USERNAME", "admin")]));
        assert!(matches!(result, Err(RuntimeConfigError::Invalid(_))));
    }

    #[test]
    fn test_file_then_environment() {
        let path = std::env::temp_dir().join(format!("mv-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
            [http]
            port = 5000

            [timeouts]
            provider = "3s"
            "#,
        )
        .unwrap();

        let config = load_config_from(env_of(&[
            ("MV_CONFIG", path.to_str().unwrap()),
            ("MV_CLIENT_ID", "from-env"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.http.port, 5000);
        assert_eq!(config.timeouts.provider, Duration::from_secs(3));
        assert_eq!(config.provider.client_id, "from-env");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_config_from(env_of(&[("MV_CONFIG", "/nonexistent/mv.toml")]));
        assert!(matches!(result, Err(RuntimeConfigError::Read { .. })));
    }
}
