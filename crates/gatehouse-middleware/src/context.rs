//! Middleware context types.
//!
//! The [`MiddlewareContext`] carries pipeline-level bookkeeping: the request
//! ID, what the recorder needs to describe the request, and the error kind the
//! normalizer settled on. It never carries the caller's identity; that value
//! is produced and consumed inside the dispatcher.

use gatehouse_core::{ErrorKind, Request, RequestId};
use http::Method;
use std::time::{Duration, Instant};

/// Context that flows through the middleware pipeline.
///
/// # Example
///
/// ```
/// use gatehouse_middleware::context::MiddlewareContext;
/// use http::Method;
///
/// let ctx = MiddlewareContext::new(Method::GET, "/addresses?client_id=3");
/// assert_eq!(ctx.target(), "/addresses?client_id=3");
/// assert!(ctx.error_kind().is_none());
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    method: Method,
    /// Path including the query string, as received.
    target: String,
    started_at: Instant,
    error_kind: Option<ErrorKind>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request ID.
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            target: target.into(),
            started_at: Instant::now(),
            error_kind: None,
        }
    }

    /// Creates a context describing `request`.
    #[must_use]
    pub fn from_request(request: &Request) -> Self {
        let target = request
            .uri()
            .path_and_query()
            .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
        Self::new(request.method().clone(), target)
    }

    /// Replaces the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path and query string.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns when the request entered the pipeline.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the time spent in the pipeline so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Returns the error kind the request terminated with, if any.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    /// Records the error kind. Only the first call has an effect.
    pub fn set_error_kind(&mut self, kind: ErrorKind) {
        self.error_kind.get_or_insert(kind);
    }
}
