//! Fixed-order request pipeline.
//!
//! The order of stages is decided here and cannot be changed by callers:
//!
//! 1. **Request Recorder** - Time the chain, emit one [`RequestRecord`](crate::RequestRecord)
//! 2. **Error Normalization** - Convert failures and panics into one wire body
//! 3. **Shutdown Gate** - Answer 503 once draining has started
//! 4. **Authentication** - Verify the bearer credential
//! 5. **Routing** - Resolve method and path to a registered route
//! 6. **Authorization** - Check the caller's role against the route
//! 7. **Handler** - Invoke the domain handler
//!
//! Each stage may short-circuit every later one. Stages 1-3 wrap the chain as
//! [`Middleware`]; stages 4-7 run inside the [`Dispatcher`].

use crate::context::MiddlewareContext;
use crate::dispatch::Dispatcher;
use crate::middleware::{Middleware, Next};
use crate::routes::RouteTable;
use crate::stages::{
    Authenticator, ErrorNormalizer, RecordSink, RequestRecorder, ShutdownGate, TracingSink,
};
use gatehouse_core::{ApiError, Request, RequestId, Response, ShutdownSignal};
use gatehouse_token::CredentialVerifier;
use http::header::HeaderValue;
use std::sync::Arc;

/// Header used to propagate the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The fixed-order pipeline.
///
/// # Example
///
/// ```ignore
/// use gatehouse_middleware::{Pipeline, RouteTable};
///
/// let pipeline = Pipeline::builder(Arc::new(codec))
///     .routes(address_routes(store))
///     .shutdown(signal.clone())
///     .build();
///
/// let response = pipeline.process(request).await;
/// ```
pub struct Pipeline {
    recorder: RequestRecorder,
    normalizer: ErrorNormalizer,
    gate: ShutdownGate,
    dispatcher: Arc<Dispatcher>,
    shutdown: ShutdownSignal,
}

impl Pipeline {
    /// Creates a builder. A credential verifier is the only required part.
    #[must_use]
    pub fn builder(verifier: Arc<dyn CredentialVerifier>) -> PipelineBuilder {
        PipelineBuilder::new(verifier)
    }

    /// Processes a request through every stage.
    ///
    /// Always produces a response. A valid UUID in `x-request-id` is kept as
    /// the request ID; otherwise a fresh one is generated. The ID is echoed on
    /// the response.
    pub async fn process(&self, request: Request) -> Response {
        let mut ctx = Self::context_for(&request);
        let response = self.run_chain(&mut ctx, request, None).await;
        Self::echo_request_id(&ctx, response)
    }

    /// Processes a request with a caller-supplied context.
    pub async fn process_with_context(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
    ) -> Response {
        self.run_chain(ctx, request, None).await
    }

    /// Answers `request` with `err` in place of the handler.
    ///
    /// Used for failures detected before the body was available, such as an
    /// oversized or unreadable body. The request still passes the shutdown
    /// gate and authentication first, so a draining server answers 503 and an
    /// anonymous caller answers 401. It is recorded and normalized like any
    /// other.
    pub async fn reject(&self, request: Request, err: ApiError) -> Response {
        let mut ctx = Self::context_for(&request);
        let response = self.run_chain(&mut ctx, request, Some(err)).await;
        Self::echo_request_id(&ctx, response)
    }

    /// Records a request the server answered itself, such as a liveness
    /// probe, and returns `response` unchanged apart from the request ID.
    ///
    /// Only the recorder runs; no credential is required.
    pub async fn answer(&self, request: Request, response: Response) -> Response {
        let mut ctx = Self::context_for(&request);
        let terminal = Next::handler(move |_ctx, _request| {
            Box::pin(async move { Ok::<_, ApiError>(response) })
        });
        let response = Next::new(&self.recorder, terminal)
            .run(&mut ctx, request)
            .await
            .unwrap_or_else(ApiError::into_response);
        Self::echo_request_id(&ctx, response)
    }

    fn context_for(request: &Request) -> MiddlewareContext {
        let ctx = MiddlewareContext::from_request(request);
        match request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<RequestId>().ok())
        {
            Some(id) => ctx.with_request_id(id),
            None => ctx,
        }
    }

    fn echo_request_id(ctx: &MiddlewareContext, mut response: Response) -> Response {
        if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }

    async fn run_chain(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        rejection: Option<ApiError>,
    ) -> Response {
        let dispatcher = Arc::clone(&self.dispatcher);
        let mut next = Next::handler(move |ctx, request| {
            let request_id = ctx.request_id();
            Box::pin(async move {
                match rejection {
                    Some(err) => dispatcher.reject(&request, err),
                    None => dispatcher.dispatch(request_id, request).await,
                }
            })
        });
        for middleware in self.middleware().into_iter().rev() {
            next = Next::new(middleware, next);
        }

        next.run(ctx, request)
            .await
            .unwrap_or_else(ApiError::into_response)
    }

    fn middleware(&self) -> [&dyn Middleware; 3] {
        [&self.recorder, &self.normalizer, &self.gate]
    }

    /// Returns the names of all stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.middleware()
            .iter()
            .map(|middleware| middleware.name())
            .chain(Stage::dispatch().into_iter().map(Stage::name))
            .collect()
    }

    /// Returns the route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        self.dispatcher.routes()
    }

    /// Returns the shutdown signal the gate observes.
    #[must_use]
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("routes", &self.routes().len())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Pipeline`].
pub struct PipelineBuilder {
    verifier: Arc<dyn CredentialVerifier>,
    routes: RouteTable,
    shutdown: ShutdownSignal,
    sink: Arc<dyn RecordSink>,
}

impl PipelineBuilder {
    /// Creates a builder with no routes, a fresh shutdown signal and the
    /// tracing record sink.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            routes: RouteTable::new(),
            shutdown: ShutdownSignal::new(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Sets the route table.
    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Sets the shutdown signal observed by the gate.
    #[must_use]
    pub fn shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Sets where request records go.
    #[must_use]
    pub fn record_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            recorder: RequestRecorder::new(self.sink),
            normalizer: ErrorNormalizer::new(),
            gate: ShutdownGate::new(self.shutdown.clone()),
            dispatcher: Arc::new(Dispatcher::new(
                Authenticator::new(self.verifier),
                self.routes,
            )),
            shutdown: self.shutdown,
        }
    }
}

/// Pipeline stage marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: Request recording
    RequestRecorder = 1,
    /// Stage 2: Error normalization
    ErrorNormalization = 2,
    /// Stage 3: Shutdown gating
    ShutdownGate = 3,
    /// Stage 4: Credential verification
    Authentication = 4,
    /// Stage 5: Route resolution
    Routing = 5,
    /// Stage 6: Role check
    Authorization = 6,
    /// Stage 7: Domain handler
    Handler = 7,
}

impl Stage {
    /// Returns true if this stage wraps the chain as middleware.
    #[must_use]
    pub const fn is_middleware(self) -> bool {
        (self as u8) <= 3
    }

    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestRecorder => "request_recorder",
            Self::ErrorNormalization => "error_normalization",
            Self::ShutdownGate => "shutdown_gate",
            Self::Authentication => "authentication",
            Self::Routing => "routing",
            Self::Authorization => "authorization",
            Self::Handler => "handler",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 7] {
        [
            Self::RequestRecorder,
            Self::ErrorNormalization,
            Self::ShutdownGate,
            Self::Authentication,
            Self::Routing,
            Self::Authorization,
            Self::Handler,
        ]
    }

    /// Returns the stages run by the dispatcher, in order.
    #[must_use]
    pub const fn dispatch() -> [Stage; 4] {
        [
            Self::Authentication,
            Self::Routing,
            Self::Authorization,
            Self::Handler,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::CollectingSink;
    use bytes::Bytes;
    use gatehouse_core::{FnHandler, ResponseExt, Role, RoleSet};
    use gatehouse_token::{TokenCodec, TokenKind};
    use http::header::AUTHORIZATION;
    use http::{Method, StatusCode};
    use std::time::Duration;

    const KEY: [u8; 32] = [5u8; 32];

    fn pipeline(sink: CollectingSink) -> Pipeline {
        let routes = RouteTable::new().route(
            Method::GET,
            "/ping",
            RoleSet::ANY,
            FnHandler::new(|_ctx, _identity, _req| async {
                Ok::<_, ApiError>(Response::empty(StatusCode::NO_CONTENT))
            }),
        );
        Pipeline::builder(Arc::new(TokenCodec::new(&KEY).unwrap()))
            .routes(routes)
            .record_sink(Arc::new(sink))
            .build()
    }

    fn authorized(uri: &str) -> http::request::Builder {
        let credential = TokenCodec::new(&KEY)
            .unwrap()
            .issue("3", Role::Client, TokenKind::Access, Duration::from_secs(60))
            .unwrap();
        http::Request::builder()
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", credential.as_str()))
    }

    #[test]
    fn test_stage_order() {
        let stages = Stage::all();
        assert_eq!(stages.len(), 7);
        assert!(stages.windows(2).all(|w| w[0] < w[1]));
        assert!(Stage::RequestRecorder.is_middleware());
        assert!(!Stage::Authentication.is_middleware());
    }

    #[test]
    fn test_stage_names_match_stage_enum() {
        let pipeline = pipeline(CollectingSink::new());
        let expected: Vec<&str> = Stage::all().iter().map(|s| s.name()).collect();
        assert_eq!(pipeline.stage_names(), expected);
    }

    #[tokio::test]
    async fn test_process_success() {
        let sink = CollectingSink::new();
        let pipeline = pipeline(sink.clone());

        let response = pipeline
            .process(authorized("/ping").body(Bytes::new()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let sink = CollectingSink::new();
        let pipeline = pipeline(sink.clone());
        let id = RequestId::new();

        let response = pipeline
            .process(
                authorized("/ping")
                    .header(REQUEST_ID_HEADER, id.to_string())
                    .body(Bytes::new())
                    .unwrap(),
            )
            .await;

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            id.to_string().as_str()
        );
        assert_eq!(sink.last().unwrap().request_id, id);
    }

    #[tokio::test]
    async fn test_invalid_request_id_replaced() {
        let pipeline = pipeline(CollectingSink::new());
        let response = pipeline
            .process(
                authorized("/ping")
                    .header(REQUEST_ID_HEADER, "not-a-uuid")
                    .body(Bytes::new())
                    .unwrap(),
            )
            .await;

        let echoed = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_ne!(echoed, "not-a-uuid");
    }

    #[tokio::test]
    async fn test_reject_is_recorded_and_normalized() {
        let sink = CollectingSink::new();
        let pipeline = pipeline(sink.clone());

        let request = authorized("/ping")
            .method(Method::POST)
            .body(Bytes::new())
            .unwrap();
        let response = pipeline
            .reject(request, ApiError::bad_request("request body too large"))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let record = sink.last().unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(record.body.as_deref(), Some(r#"{"error":"request body too large"}"#));
    }

    #[tokio::test]
    async fn test_reject_without_credential_is_unauthorized() {
        let sink = CollectingSink::new();
        let pipeline = pipeline(sink.clone());

        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/ping")
            .body(Bytes::new())
            .unwrap();
        let response = pipeline
            .reject(request, ApiError::bad_request("request body too large"))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.last().unwrap().body.as_deref(), Some(r#"{"error":"unauthorized"}"#));
    }

    #[tokio::test]
    async fn test_reject_while_draining_is_unavailable() {
        let sink = CollectingSink::new();
        let pipeline = pipeline(sink.clone());
        assert!(pipeline.shutdown_signal().trigger());

        let request = authorized("/ping")
            .method(Method::POST)
            .body(Bytes::new())
            .unwrap();
        let response = pipeline
            .reject(request, ApiError::bad_request("request body too large"))
            .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_answer_records_without_credential() {
        let sink = CollectingSink::new();
        let pipeline = pipeline(sink.clone());

        let request = http::Request::builder().uri("/health").body(Bytes::new()).unwrap();
        let response = pipeline
            .answer(request, Response::empty(StatusCode::OK))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let record = sink.last().unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(record.path, "/health");
        assert_eq!(record.status, StatusCode::OK);
        assert!(record.body.is_none());
    }

    #[tokio::test]
    async fn test_missing_credential_is_recorded() {
        let sink = CollectingSink::new();
        let pipeline = pipeline(sink.clone());

        let response = pipeline
            .process(http::Request::builder().uri("/ping").body(Bytes::new()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let record = sink.last().unwrap();
        assert_eq!(record.status, StatusCode::UNAUTHORIZED);
        assert_eq!(record.body.as_deref(), Some(r#"{"error":"unauthorized"}"#));
    }
}
