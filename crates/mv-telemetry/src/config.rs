//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "mobile-verify".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MV_SERVICE_NAME`: Service name (default: mobile-verify)
    /// - `MV_LOG_LEVEL`: Log level (default: info). `RUST_LOG` overrides it at
    ///   subscriber construction.
    /// - `MV_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("MV_SERVICE_NAME")
                .unwrap_or_else(|_| "mobile-verify".to_string()),

            log_level: env::var("MV_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("MV_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "mobile-verify");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }
}
