//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use gatehouse_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("0.0.0.0:8080")
//!     .shutdown_timeout(Duration::from_secs(10))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "0.0.0.0:8080");
//! assert_eq!(config.max_body_bytes(), gatehouse_server::config::DEFAULT_MAX_BODY_BYTES);
//! ```

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request body cap (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Listener address, drain window and body cap.
///
/// Built with [`ServerConfig::builder`]; every field has a default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    max_body_bytes: usize,
}

impl ServerConfig {
    /// Starts from the defaults.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Address to bind, as configured.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// The bind address parsed into a [`SocketAddr`].
    ///
    /// Host names are not resolved, so `localhost:8080` is an error.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.http_addr.parse()
    }

    /// How long open connections may keep draining once shutdown starts.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Bodies longer than this are answered with 400.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Address to bind.
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.http_addr = addr.into();
        self
    }

    /// Drain window.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Request body cap.
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}
