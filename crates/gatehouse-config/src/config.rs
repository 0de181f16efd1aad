//! The root configuration type.

use std::net::SocketAddr;
use std::time::Duration;

use gatehouse_telemetry::LogFormat;
use serde::Deserialize;

use crate::{AuthSection, ConfigError, ServerSection, TelemetrySection};

/// Required length of the credential key in bytes.
pub const TOKEN_KEY_LEN: usize = 32;

/// Complete Gatehouse configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use gatehouse_config::GatehouseConfig;
///
/// let config = GatehouseConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// // No key configured yet.
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GatehouseConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerSection,

    /// Credential configuration.
    #[serde(default)]
    pub auth: AuthSection,

    /// Logging and metrics configuration.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl GatehouseConfig {
    /// Development preset: pretty debug logs on localhost.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field:
    /// - an unparsable server or (enabled) metrics address
    /// - a credential key that is not exactly 32 bytes
    /// - a zero access or refresh TTL
    /// - a zero shutdown timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_addr("server.http_addr", &self.server.http_addr)?;

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }

        let key_len = self.auth.token_symmetric_key.len();
        if key_len != TOKEN_KEY_LEN {
            return Err(ConfigError::invalid(
                "auth.token_symmetric_key",
                format!("must be exactly {TOKEN_KEY_LEN} bytes, got {key_len}"),
            ));
        }

        if self.auth.access_token_ttl_secs == 0 {
            return Err(ConfigError::invalid(
                "auth.access_token_ttl_secs",
                "must be greater than zero",
            ));
        }

        if self.auth.refresh_token_ttl_secs == 0 {
            return Err(ConfigError::invalid(
                "auth.refresh_token_ttl_secs",
                "must be greater than zero",
            ));
        }

        if self.telemetry.metrics.enabled {
            check_addr("telemetry.metrics.addr", &self.telemetry.metrics.addr)?;
        }

        Ok(())
    }

    /// Drain window as a `Duration`.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Access credential lifetime.
    #[must_use]
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.access_token_ttl_secs)
    }

    /// Refresh credential lifetime.
    #[must_use]
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.refresh_token_ttl_secs)
    }
}

fn check_addr(field: &'static str, addr: &str) -> Result<(), ConfigError> {
    addr.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|_| ConfigError::invalid(field, format!("invalid socket address: {addr}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn valid() -> GatehouseConfig {
        let mut config = GatehouseConfig::default();
        config.auth.token_symmetric_key = KEY.to_string();
        config
    }

    fn invalid_field(config: &GatehouseConfig) -> &'static str {
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => field,
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_key_length() {
        let mut config = valid();
        config.auth.token_symmetric_key = "short".to_string();
        assert_eq!(invalid_field(&config), "auth.token_symmetric_key");

        config.auth.token_symmetric_key = format!("{KEY}x");
        assert_eq!(invalid_field(&config), "auth.token_symmetric_key");
    }

    #[test]
    fn test_bad_server_addr() {
        let mut config = valid();
        config.server.http_addr = "localhost".to_string();
        assert_eq!(invalid_field(&config), "server.http_addr");
    }

    #[test]
    fn test_zero_values() {
        let mut config = valid();
        config.server.shutdown_timeout_secs = 0;
        assert_eq!(invalid_field(&config), "server.shutdown_timeout_secs");

        let mut config = valid();
        config.auth.access_token_ttl_secs = 0;
        assert_eq!(invalid_field(&config), "auth.access_token_ttl_secs");

        let mut config = valid();
        config.auth.refresh_token_ttl_secs = 0;
        assert_eq!(invalid_field(&config), "auth.refresh_token_ttl_secs");
    }

    #[test]
    fn test_metrics_addr_checked_only_when_enabled() {
        let mut config = valid();
        config.telemetry.metrics.addr = "nowhere".to_string();
        assert!(config.validate().is_ok());

        config.telemetry.metrics.enabled = true;
        assert_eq!(invalid_field(&config), "telemetry.metrics.addr");
    }

    #[test]
    fn test_durations() {
        let config = valid();
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.access_token_ttl(), Duration::from_secs(900));
        assert_eq!(config.refresh_token_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_development_preset() {
        let config = GatehouseConfig::development();
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
        assert_eq!(config.telemetry.logging.level, "debug");
    }
}
