//! # Gatehouse Core
//!
//! Core types and traits shared by every Gatehouse crate.
//!
//! - [`RequestContext`] - Per-request routing data (request ID, path params, query)
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Identity`], [`Role`], [`RoleSet`] - Verified caller identity and access tiers
//! - [`ApiError`] - The closed error taxonomy every failure is normalized into
//! - [`Handler`] - Domain handler trait invoked after authorization
//! - [`Store`] - Persistence capability consumed by handlers
//! - [`ShutdownSignal`] - Process-wide, one-way shutdown flag

#![doc(html_root_url = "https://docs.rs/gatehouse-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
pub mod extract;
mod handler;
mod identity;
pub mod shutdown;
mod store;
pub mod types;

pub use context::{RequestContext, RequestId};
pub use error::{
    ApiError, ApiResult, ErrorKind, FieldViolation, FieldViolations, WireError, WireFieldError,
    INTERNAL_MESSAGE,
};
pub use extract::{Json, Validate};
pub use handler::{FnHandler, Handler};
pub use identity::{Identity, ParseRoleError, Role, RoleSet};
pub use shutdown::ShutdownSignal;
pub use store::{Store, StoreError};
pub use types::{BoxFuture, Request, Response, ResponseExt};
