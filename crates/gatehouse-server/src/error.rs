//! Server error types.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address is not a socket address.
    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The rejected address.
        addr: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The listener failed after binding.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
