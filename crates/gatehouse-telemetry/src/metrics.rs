//! Prometheus metrics for Gatehouse.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `gatehouse_requests_total` | Counter | `method`, `status` | Total requests |
//! | `gatehouse_request_duration_seconds` | Histogram | `method` | Request latency |
//! | `gatehouse_in_flight_requests` | Gauge | - | In-flight requests |
//!
//! Recording functions go through the `metrics` facade. Without an installed
//! recorder they are no-ops.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Counter of completed requests.
pub const REQUESTS_TOTAL: &str = "gatehouse_requests_total";
/// Histogram of request latency in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "gatehouse_request_duration_seconds";
/// Gauge of requests currently inside the pipeline.
pub const IN_FLIGHT_REQUESTS: &str = "gatehouse_in_flight_requests";

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address the Prometheus scrape endpoint listens on.
    pub addr: String,

    /// Histogram buckets for request duration.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: "0.0.0.0:9090".to_string(),
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a tokio runtime when enabled.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidAddress`] for an unparsable address and
/// [`TelemetryError::MetricsInit`] if the exporter cannot be installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|source| TelemetryError::InvalidAddress {
            addr: config.addr.clone(),
            source,
        })?;

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .with_http_listener(addr)
        .install()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    register_metric_descriptions();
    tracing::info!(%addr, "Prometheus metrics listener installed");

    Ok(())
}

/// Registers descriptions for all standard metrics.
pub fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests processed");
    describe_histogram!(REQUEST_DURATION_SECONDS, "HTTP request duration in seconds");
    describe_gauge!(
        IN_FLIGHT_REQUESTS,
        "Number of HTTP requests currently being processed"
    );
}

/// Records a completed request.
pub fn record_request(method: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(duration.as_secs_f64());
}

/// Guard that keeps the in-flight gauge accurate.
///
/// Increments on creation and decrements on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}
