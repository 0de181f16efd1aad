//! Assembly of a running gateway from configuration.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use gatehouse_address::{address_routes, InMemoryAddressStore};
use gatehouse_config::{
    ConfigError, ConfigLoader, GatehouseConfig, ServerSection, TelemetrySection, ENV_PREFIX,
};
use gatehouse_core::ShutdownSignal;
use gatehouse_middleware::Pipeline;
use gatehouse_server::{Server, ServerConfig, ServerError};
use gatehouse_telemetry::{LogConfig, MetricsConfig, TelemetryConfig, TelemetryError};
use gatehouse_token::{TokenCodec, TokenError};
use thiserror::Error;

/// Environment variable naming an optional TOML or JSON config file.
pub const CONFIG_PATH_VAR: &str = "GATEHOUSE_CONFIG";

/// Startup failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The token codec rejected the configured key.
    #[error("token key rejected: {0}")]
    Credential(#[from] TokenError),

    /// The server could not bind or serve.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Loads configuration from `GATEHOUSE_CONFIG` (if set), `.env` and
/// `GATEHOUSE__*` variables.
pub fn load_config() -> Result<GatehouseConfig, ConfigError> {
    load_config_from(std::env::var_os(CONFIG_PATH_VAR))
}

/// Loads configuration with an explicit file path.
///
/// A path that is given must exist.
pub fn load_config_from(path: Option<OsString>) -> Result<GatehouseConfig, ConfigError> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.with_file(Path::new(&path))?;
    }
    loader.with_dotenv()?.with_env_prefix(ENV_PREFIX).load()
}

/// Maps the telemetry section onto the telemetry crate's configuration.
pub fn telemetry_config(section: &TelemetrySection) -> TelemetryConfig {
    TelemetryConfig {
        logging: LogConfig {
            enabled: section.logging.enabled,
            level: section.logging.level.clone(),
            format: section.logging.format,
            ..LogConfig::default()
        },
        metrics: MetricsConfig {
            enabled: section.metrics.enabled,
            addr: section.metrics.addr.clone(),
            ..MetricsConfig::default()
        },
    }
}

/// Maps the server section onto the server's configuration.
pub fn server_config(section: &ServerSection) -> ServerConfig {
    ServerConfig::builder()
        .http_addr(section.http_addr.clone())
        .shutdown_timeout(std::time::Duration::from_secs(section.shutdown_timeout_secs))
        .max_body_bytes(section.max_body_bytes)
        .build()
}

/// Builds the pipeline protecting the address resource.
pub fn build_pipeline(
    config: &GatehouseConfig,
    shutdown: ShutdownSignal,
) -> Result<Pipeline, TokenError> {
    let codec = TokenCodec::new(config.auth.token_symmetric_key.as_bytes())?;
    let store = Arc::new(InMemoryAddressStore::new());

    Ok(Pipeline::builder(Arc::new(codec))
        .routes(address_routes(store))
        .shutdown(shutdown)
        .build())
}

/// Builds the server for `config`.
pub fn build_server(config: &GatehouseConfig, shutdown: ShutdownSignal) -> Result<Server, AppError> {
    let pipeline = build_pipeline(config, shutdown)?;
    Ok(Server::new(server_config(&config.server), pipeline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_config::LogFormat;

    fn config() -> GatehouseConfig {
        let mut config = GatehouseConfig::development();
        config.auth.token_symmetric_key = "k".repeat(32);
        config
    }

    #[test]
    fn test_telemetry_mapping() {
        let mut section = TelemetrySection::default();
        section.logging.level = "warn".to_string();
        section.logging.format = LogFormat::Pretty;
        section.metrics.enabled = true;
        section.metrics.addr = "127.0.0.1:9999".to_string();

        let mapped = telemetry_config(&section);
        assert_eq!(mapped.logging.level, "warn");
        assert_eq!(mapped.logging.format, LogFormat::Pretty);
        assert!(mapped.metrics.enabled);
        assert_eq!(mapped.metrics.addr, "127.0.0.1:9999");
        assert!(!mapped.metrics.duration_buckets.is_empty());
    }

    #[test]
    fn test_server_mapping() {
        let config = config();
        let mapped = server_config(&config.server);
        assert_eq!(mapped.http_addr(), config.server.http_addr);
        assert_eq!(mapped.shutdown_timeout(), config.shutdown_timeout());
        assert_eq!(mapped.max_body_bytes(), config.server.max_body_bytes);
    }

    #[test]
    fn test_build_pipeline_uses_shared_signal() {
        let signal = ShutdownSignal::new();
        let pipeline = build_pipeline(&config(), signal.clone()).unwrap();

        assert_eq!(pipeline.routes().len(), 5);
        signal.trigger();
        assert!(pipeline.shutdown_signal().is_shutdown());
    }

    #[test]
    fn test_build_rejects_short_key() {
        let mut config = config();
        config.auth.token_symmetric_key = "short".to_string();
        assert!(matches!(
            build_server(&config, ShutdownSignal::new()),
            Err(AppError::Credential(TokenError::InvalidKeyLength))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let result = load_config_from(Some("/definitely/not/here.toml".into()));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
