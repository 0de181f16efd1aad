//! # Gatehouse
//!
//! **Authenticating, authorizing HTTP gateway**
//!
//! Every request passes a fixed pipeline before it reaches a handler:
//!
//! ```text
//! Request → Recorder → ErrorNormalizer → ShutdownGate → Auth → Routing → AuthZ → Handler
//! ```
//!
//! Credentials are opaque, authenticated and expiring tokens sealed under a
//! single symmetric key. Every failure leaves the pipeline as one of a small
//! set of JSON wire errors.
//!
//! This crate re-exports the member crates and wires them together for the
//! `gatehouse` binary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gatehouse::app;
//! use gatehouse::core::ShutdownSignal;
//!
//! # async fn run() -> Result<(), gatehouse::app::AppError> {
//! let config = app::load_config()?;
//! let server = app::build_server(&config, ShutdownSignal::new())?;
//! // Ctrl-C or SIGTERM starts the drain.
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/gatehouse/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;

pub use gatehouse_address as address;
pub use gatehouse_config as config;
pub use gatehouse_core as core;
pub use gatehouse_middleware as middleware;
pub use gatehouse_server as server;
pub use gatehouse_telemetry as telemetry;
pub use gatehouse_token as token;

/// Common imports for building services on the pipeline.
///
/// ```rust
/// use gatehouse::prelude::*;
///
/// let routes = RouteTable::new();
/// assert!(routes.is_empty());
/// ```
pub mod prelude {
    pub use gatehouse_core::{
        ApiError, FieldViolations, FnHandler, Identity, Request, RequestContext, Response,
        ResponseExt, Role, RoleSet, ShutdownSignal, Store, StoreError, Validate,
    };
    pub use gatehouse_middleware::{Pipeline, RouteTable};
    pub use gatehouse_server::{DrainOutcome, Server, ServerConfig};
    pub use gatehouse_token::{CredentialVerifier, TokenCodec, TokenKind};
}
