//! Shutdown gate middleware.
//!
//! Once the process starts draining, new requests are refused with
//! `503 Service Unavailable` before any credential is examined. Requests that
//! passed the gate earlier run to completion.
//!
//! # Pipeline Position
//!
//! ```text
//! RequestRecorder → ErrorNormalizer → [ShutdownGate] → Dispatcher
//! ```

use crate::{
    context::MiddlewareContext,
    middleware::{Middleware, Next, Outcome},
};
use bytes::Bytes;
use gatehouse_core::{BoxFuture, Request, Response, ResponseExt, ShutdownSignal};
use http::StatusCode;

/// Body returned while draining.
pub const DRAINING_BODY: &[u8] = br#"{"error":"server is shutting down"}"#;

/// Middleware that refuses new work after shutdown has been triggered.
#[derive(Debug, Clone)]
pub struct ShutdownGate {
    signal: ShutdownSignal,
}

impl ShutdownGate {
    /// Creates a gate observing `signal`.
    #[must_use]
    pub fn new(signal: ShutdownSignal) -> Self {
        Self { signal }
    }

    /// Returns the 503 response sent while draining.
    #[must_use]
    pub fn draining_response() -> Response {
        Response::json_bytes(
            StatusCode::SERVICE_UNAVAILABLE,
            Bytes::from_static(DRAINING_BODY),
        )
    }
}

impl Middleware for ShutdownGate {
    fn name(&self) -> &'static str {
        "shutdown_gate"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            if self.signal.is_shutdown() {
                tracing::debug!(request_id = %ctx.request_id(), "Refusing request while draining");
                return Ok(Self::draining_response());
            }
            next.run(ctx, request).await
        })
    }
}
