//! Test error types.

use thiserror::Error;

/// Errors raised while building requests or reading responses.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be built.
    #[error("request build error: {0}")]
    RequestBuild(String),

    /// The response body could not be read.
    #[error("body read error: {0}")]
    BodyRead(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A test credential could not be issued.
    #[error("credential error: {0}")]
    Credential(#[from] gatehouse_token::TokenError),
}
