//! Typed, layered configuration for Gatehouse.
//!
//! - TOML and JSON configuration files
//! - `.env` loading via `dotenvy`
//! - `GATEHOUSE__SECTION__KEY` environment overrides
//! - Strict parsing: unknown fields are errors
//!
//! # Example
//!
//! ```no_run
//! use gatehouse_config::{ConfigLoader, ENV_PREFIX};
//!
//! # fn main() -> Result<(), gatehouse_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("gatehouse.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix(ENV_PREFIX)
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! max_body_bytes = 1048576
//!
//! [auth]
//! token_symmetric_key = "0123456789abcdef0123456789abcdef"
//! access_token_ttl_secs = 900
//! refresh_token_ttl_secs = 86400
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = false
//! addr = "0.0.0.0:9090"
//! ```

#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{GatehouseConfig, TOKEN_KEY_LEN};
pub use error::ConfigError;
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use schema::{AuthSection, LoggingSection, MetricsSection, ServerSection, TelemetrySection};

pub use gatehouse_telemetry::LogFormat;
