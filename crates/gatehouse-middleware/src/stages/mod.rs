//! Pipeline stages.
//!
//! Stages wrapping the chain implement [`Middleware`](crate::Middleware):
//!
//! 1. [`recorder`] - Time the chain and emit one record per request
//! 2. [`error_normalization`] - Convert every failure into its wire body
//! 3. [`shutdown_gate`] - Refuse new work while draining
//!
//! The remaining stages run inside the [`Dispatcher`](crate::Dispatcher),
//! where the typed identity lives:
//!
//! 4. [`authentication`] - Verify the bearer credential
//! 5. Route resolution ([`RouteTable`](crate::RouteTable))
//! 6. [`authorization`] - Check the caller's role against the route

pub mod authentication;
pub mod authorization;
pub mod error_normalization;
pub mod recorder;
pub mod shutdown_gate;

pub use authentication::Authenticator;
pub use authorization::AuthorizationGate;
pub use error_normalization::ErrorNormalizer;
pub use recorder::{CollectingSink, RecordSink, RequestRecord, RequestRecorder, TracingSink};
pub use shutdown_gate::ShutdownGate;
