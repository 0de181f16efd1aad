//! Terminal dispatcher.
//!
//! The dispatcher is the innermost link of the chain. It owns the typed
//! identity for the lifetime of one request:
//!
//! ```text
//! authenticate → resolve route → authorize → build RequestContext → handler
//! ```
//!
//! Each step returns on the first failure; nothing after it runs.

use crate::middleware::Outcome;
use crate::routes::RouteTable;
use crate::stages::{AuthorizationGate, Authenticator};
use gatehouse_core::{ApiError, BoxFuture, Request, RequestContext, RequestId};

/// Authenticates, routes, authorizes and invokes the handler.
#[derive(Debug)]
pub struct Dispatcher {
    authenticator: Authenticator,
    routes: RouteTable,
    gate: AuthorizationGate,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(authenticator: Authenticator, routes: RouteTable) -> Self {
        Self {
            authenticator,
            routes,
            gate: AuthorizationGate::new(),
        }
    }

    /// Returns the route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Dispatches one request.
    pub fn dispatch(&self, request_id: RequestId, request: Request) -> BoxFuture<'_, Outcome> {
        Box::pin(async move {
            let identity = self.authenticator.authenticate(request.headers())?;

            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let (route, params) = self
                .routes
                .resolve(&method, &path)
                .ok_or_else(|| ApiError::not_found("route not found"))?
                .into_parts();

            self.gate.check(&identity, route.allowed())?;

            let ctx = RequestContext::new(request_id, method, path)
                .with_params(params)
                .with_query_string(request.uri().query())?;

            tracing::debug!(
                %request_id,
                caller = %identity.log_id(),
                route = route.pattern(),
                "Dispatching to handler"
            );

            route.handler().handle(&ctx, &identity, request).await
        })
    }

    /// Answers a request whose body could not be read.
    ///
    /// The credential is still checked first, so an anonymous caller learns
    /// nothing about the body limit.
    pub fn reject(&self, request: &Request, err: ApiError) -> Outcome {
        self.authenticator.authenticate(request.headers())?;
        Err(err)
    }
}
