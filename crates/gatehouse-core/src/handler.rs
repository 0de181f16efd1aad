//! Handler trait for request processing.
//!
//! The [`Handler`] trait is the boundary between the pipeline and domain code.
//! A handler runs only after authentication and authorization succeeded, so it
//! always receives a verified [`Identity`].

use std::future::Future;

use crate::{ApiError, BoxFuture, Identity, Request, RequestContext, Response};

/// A domain request handler.
///
/// Handlers are stored type-erased in the route table, so the trait returns a
/// boxed future rather than using `async fn`.
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse_core::{ApiError, BoxFuture, Handler, Identity, Request, RequestContext, Response, ResponseExt};
/// use http::StatusCode;
///
/// struct WhoAmI;
///
/// impl Handler for WhoAmI {
///     fn handle<'a>(
///         &'a self,
///         _ctx: &'a RequestContext,
///         identity: &'a Identity,
///         _request: Request,
///     ) -> BoxFuture<'a, Result<Response, ApiError>> {
///         Box::pin(async move { Response::json(StatusCode::OK, identity) })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles a request and returns a response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if decoding, validation or the store fails.
    fn handle<'a>(
        &'a self,
        ctx: &'a RequestContext,
        identity: &'a Identity,
        request: Request,
    ) -> BoxFuture<'a, Result<Response, ApiError>>;
}

/// A function-based handler wrapper.
///
/// The closure receives owned copies of the context and identity so it can
/// return a `'static` future.
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse_core::{FnHandler, Response, ResponseExt};
/// use http::StatusCode;
///
/// let handler = FnHandler::new(|_ctx, _identity, _req| async {
///     Ok(Response::empty(StatusCode::NO_CONTENT))
/// });
/// ```
pub struct FnHandler<F> {
    func: F,
}

impl<F, Fut> FnHandler<F>
where
    F: Fn(RequestContext, Identity, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
{
    /// Creates a new function-based handler.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(RequestContext, Identity, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        ctx: &'a RequestContext,
        identity: &'a Identity,
        request: Request,
    ) -> BoxFuture<'a, Result<Response, ApiError>> {
        Box::pin((self.func)(ctx.clone(), identity.clone(), request))
    }
}
