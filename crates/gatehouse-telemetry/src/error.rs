//! Telemetry error types.

use std::net::AddrParseError;

use thiserror::Error;

/// Errors raised while installing logging or metrics.
///
/// Installation happens once at startup; none of these are recoverable by
/// retrying with the same configuration.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directive does not parse.
    #[error("invalid log filter {directive:?}: {reason}")]
    InvalidFilter {
        /// Directive as configured.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("logging could not be installed: {0}")]
    LoggingInit(String),

    /// The metrics listen address does not parse.
    #[error("invalid metrics address {addr:?}")]
    InvalidAddress {
        /// Address as configured.
        addr: String,
        /// Parse failure.
        #[source]
        source: AddrParseError,
    },

    /// The Prometheus exporter could not be installed.
    #[error("metrics exporter could not be installed: {0}")]
    MetricsInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_filter_error_names_directive() {
        let err = TelemetryError::InvalidFilter {
            directive: "gatehouse=loud".to_string(),
            reason: "invalid level".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"invalid log filter "gatehouse=loud": invalid level"#
        );
    }

    #[test]
    fn test_address_error_keeps_source() {
        let source = "nowhere".parse::<std::net::SocketAddr>().unwrap_err();
        let err = TelemetryError::InvalidAddress {
            addr: "nowhere".to_string(),
            source,
        };
        assert_eq!(err.to_string(), r#"invalid metrics address "nowhere""#);
        assert!(err.source().is_some());
    }
}
