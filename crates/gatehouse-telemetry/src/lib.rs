//! Structured logging and Prometheus metrics for Gatehouse.
//!
//! - **Logging**: `tracing` events rendered by `tracing-subscriber`, JSON in
//!   production and pretty in development
//! - **Metrics**: request counters, latency histograms and an in-flight gauge
//!   exported in Prometheus format
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_telemetry(&TelemetryConfig::default()).expect("Failed to init telemetry");
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use self::logging::{init_logging, LogConfig, LogFormat};
pub use self::metrics::{init_metrics, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
