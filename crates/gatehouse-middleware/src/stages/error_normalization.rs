//! Error normalization middleware.
//!
//! Every failure raised below this stage, by a later stage or by a handler,
//! converges here and leaves as exactly one wire body with its matching
//! status. Panics are caught at this boundary and become
//! [`ApiError::Internal`].
//!
//! # Pipeline Position
//!
//! ```text
//! RequestRecorder → [ErrorNormalizer] → ShutdownGate → Dispatcher
//! ```
//!
//! # Error Body Format
//!
//! ```json
//! {"error": "unauthorized"}
//! {"errors": [{"field": "title", "message": "title is required"}]}
//! ```
//!
//! Internal detail (error chains, panic payloads, verification reasons) is
//! logged and never serialized.

use crate::{
    context::MiddlewareContext,
    middleware::{Middleware, Next, Outcome},
};
use futures_util::FutureExt;
use gatehouse_core::{ApiError, BoxFuture, Request};
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;

/// Middleware that converts every failure into its wire response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorNormalizer;

impl ErrorNormalizer {
    /// Creates a new error normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn log(ctx: &MiddlewareContext, err: &ApiError) {
        let request_id = ctx.request_id();
        match err {
            ApiError::Internal(source) => {
                tracing::error!(
                    %request_id,
                    error = %source,
                    chain = ?source,
                    "Internal error"
                );
            }
            ApiError::Validation(violations) => {
                tracing::debug!(
                    %request_id,
                    violations = %violations,
                    count = violations.len(),
                    "Validation failed"
                );
            }
            ApiError::BadRequest { .. }
            | ApiError::Unauthorized
            | ApiError::Forbidden
            | ApiError::NotFound { .. } => {
                tracing::debug!(%request_id, kind = err.kind().as_str(), error = %err, "Request rejected");
            }
        }
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Middleware for ErrorNormalizer {
    fn name(&self) -> &'static str {
        "error_normalization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let outcome = match AssertUnwindSafe(next.run(ctx, request)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    let backtrace = Backtrace::force_capture();
                    tracing::error!(
                        request_id = %ctx.request_id(),
                        panic = message,
                        %backtrace,
                        "Recovered panic in request chain"
                    );
                    Err(ApiError::internal(anyhow::anyhow!("handler panicked: {message}")))
                }
            };

            match outcome {
                Ok(response) => Ok(response),
                Err(err) => {
                    Self::log(ctx, &err);
                    ctx.set_error_kind(err.kind());
                    Ok(err.into_response())
                }
            }
        })
    }
}
