//! Core middleware trait and types.
//!
//! Every stage that wraps the chain implements [`Middleware`]. A stage
//! receives the mutable context, the request and a [`Next`] it may call at
//! most once. Not calling it short-circuits every later stage.
//!
//! Stages exchange an [`Outcome`] rather than a bare response, so a failure
//! travels as a typed [`ApiError`] until the error normalizer turns it into
//! the wire body.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_middleware::{Middleware, MiddlewareContext, Next, Outcome};
//! use gatehouse_core::{BoxFuture, Request};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Outcome> {
//!         Box::pin(async move {
//!             let outcome = next.run(ctx, request).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "chain finished");
//!             outcome
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use gatehouse_core::{ApiError, BoxFuture, Request, Response};

/// What a stage hands back to the stage that called it.
pub type Outcome = Result<Response, ApiError>;

/// The core middleware trait.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once
/// - A stage that short-circuits returns its own outcome without calling `next`
/// - A stage never retries a failed downstream outcome
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this middleware stage.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome>;
}

// Terminal futures are `'static` so `Next<'a>` stays covariant in `'a`.
type Terminal<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a>;

/// Callback to invoke the rest of the chain.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Terminal<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware`, then `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next`.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the terminal handler.
    ///
    /// This consumes `self` so it can only be called once.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Outcome {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}
