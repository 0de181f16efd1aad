//! Request recording middleware.
//!
//! The recorder is the outermost stage. It times the whole chain and emits
//! exactly one [`RequestRecord`] per request, whichever stage ended it.
//!
//! # Pipeline Position
//!
//! ```text
//! [RequestRecorder] → ErrorNormalizer → ShutdownGate → Dispatcher
//! ```
//!
//! # Log Format
//!
//! [`TracingSink`] emits one event per request with the fields `request_id`,
//! `method`, `path`, `status_code`, `status_text` and `duration_ms`. Failed
//! requests (status ≥ 400) are logged at `error` and also carry `body`.

use crate::{
    context::MiddlewareContext,
    middleware::{Middleware, Next, Outcome},
};
use bytes::Bytes;
use gatehouse_core::{ApiError, BoxFuture, ErrorKind, Request, RequestId, Response};
use gatehouse_telemetry::metrics::{record_request, InFlightGuard};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// One observability entry per request.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    /// The request ID.
    pub request_id: RequestId,
    /// The HTTP method.
    pub method: Method,
    /// Path including the query string.
    pub path: String,
    /// The response status.
    pub status: StatusCode,
    /// Time spent in the pipeline.
    pub duration: Duration,
    /// Error kind the request terminated with.
    pub error_kind: Option<ErrorKind>,
    /// Lossy UTF-8 copy of the response body. Present only when status ≥ 400.
    pub body: Option<String>,
}

impl RequestRecord {
    /// Returns the canonical reason phrase for the status.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Returns the duration in fractional milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Destination for request records.
pub trait RecordSink: Send + Sync + 'static {
    /// Consumes one record. Called exactly once per request.
    fn record(&self, record: RequestRecord);
}

/// Logs records through `tracing` and updates request metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn record(&self, record: RequestRecord) {
        record_request(record.method.as_str(), record.status.as_u16(), record.duration);

        if record.status.as_u16() < 400 {
            tracing::info!(
                request_id = %record.request_id,
                method = %record.method,
                path = %record.path,
                status_code = record.status.as_u16(),
                status_text = record.status_text(),
                duration_ms = record.duration_ms(),
                "Request completed"
            );
        } else {
            tracing::error!(
                request_id = %record.request_id,
                method = %record.method,
                path = %record.path,
                status_code = record.status.as_u16(),
                status_text = record.status_text(),
                duration_ms = record.duration_ms(),
                error_kind = record.error_kind.map(ErrorKind::as_str),
                body = record.body.as_deref().unwrap_or(""),
                "Request failed"
            );
        }
    }
}

/// Keeps records in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// pipeline and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    records: Arc<Mutex<Vec<RequestRecord>>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record received so far.
    #[must_use]
    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.lock().clone()
    }

    /// Returns the most recent record.
    #[must_use]
    pub fn last(&self) -> Option<RequestRecord> {
        self.records.lock().last().cloned()
    }

    /// Returns the number of records received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl RecordSink for CollectingSink {
    fn record(&self, record: RequestRecord) {
        self.records.lock().push(record);
    }
}

/// Middleware that times the chain and emits one record per request.
#[derive(Clone)]
pub struct RequestRecorder {
    sink: Arc<dyn RecordSink>,
}

impl RequestRecorder {
    /// Creates a recorder writing to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self { sink }
    }
}

impl Default for RequestRecorder {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl std::fmt::Debug for RequestRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRecorder").finish_non_exhaustive()
    }
}

/// Splits a response so its body can be copied, then rebuilds it.
async fn snapshot(response: Response) -> (Response, String) {
    let (parts, body) = response.into_parts();
    let bytes: Bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    let text = String::from_utf8_lossy(&bytes).into_owned();
    (Response::from_parts(parts, Full::new(bytes)), text)
}

impl Middleware for RequestRecorder {
    fn name(&self) -> &'static str {
        "request_recorder"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let _in_flight = InFlightGuard::new();

            let response = match next.run(ctx, request).await {
                Ok(response) => response,
                // The normalizer sits inside this stage; this arm only runs
                // when it is absent from a hand-built chain.
                Err(err) => {
                    ctx.set_error_kind(err.kind());
                    err.into_response()
                }
            };

            let status = response.status();
            let (response, body) = if status.as_u16() >= 400 {
                let (response, body) = snapshot(response).await;
                (response, Some(body))
            } else {
                (response, None)
            };

            self.sink.record(RequestRecord {
                request_id: ctx.request_id(),
                method: ctx.method().clone(),
                path: ctx.target().to_string(),
                status,
                duration: ctx.elapsed(),
                error_kind: ctx.error_kind(),
                body,
            });

            Ok::<_, ApiError>(response)
        })
    }
}
