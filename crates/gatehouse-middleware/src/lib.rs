//! # Gatehouse Middleware
//!
//! The fixed-order request pipeline every Gatehouse request passes through.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → Recorder → ErrorNormalizer → ShutdownGate → Authentication
//!         → Routing → Authorization → Handler
//! Response ← Recorder ← ErrorNormalizer ←────────────────────────┘
//! ```
//!
//! | Stage | Component | Failure |
//! |-------|-----------|---------|
//! | 1 | [`RequestRecorder`] | - |
//! | 2 | [`ErrorNormalizer`] | panics become 500 |
//! | 3 | [`ShutdownGate`] | 503 while draining |
//! | 4 | [`Authenticator`] | 401 |
//! | 5 | [`RouteTable`] | 404 |
//! | 6 | [`AuthorizationGate`] | 403 |
//! | 7 | [`Handler`](gatehouse_core::Handler) | 400, 404, 422, 500 |
//!
//! The first failure ends the chain. Exactly one wire body and one
//! [`RequestRecord`] are produced per request.
//!
//! ## Example
//!
//! ```
//! use gatehouse_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 7);
//! assert_eq!(stages[0].name(), "request_recorder");
//! assert_eq!(stages[6].name(), "handler");
//! ```

#![doc(html_root_url = "https://docs.rs/gatehouse-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod dispatch;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod stages;

pub use context::MiddlewareContext;
pub use dispatch::Dispatcher;
pub use middleware::{Middleware, Next, Outcome};
pub use pipeline::{Pipeline, PipelineBuilder, Stage, REQUEST_ID_HEADER};
pub use routes::{Route, RouteMatch, RouteTable};
pub use stages::{
    Authenticator, AuthorizationGate, CollectingSink, ErrorNormalizer, RecordSink, RequestRecord,
    RequestRecorder, ShutdownGate, TracingSink,
};
