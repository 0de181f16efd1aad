//! Route registration and path matching.
//!
//! A [`RouteTable`] maps `(method, path pattern)` to a handler and the set of
//! roles allowed to reach it. Patterns use `{name}` segments:
//!
//! ```rust
//! use gatehouse_core::{ApiError, FnHandler, Response, ResponseExt, RoleSet};
//! use gatehouse_middleware::RouteTable;
//! use http::{Method, StatusCode};
//!
//! let routes = RouteTable::new().route(
//!     Method::GET,
//!     "/addresses/{id}",
//!     RoleSet::ADMIN_TIER,
//!     FnHandler::new(|_ctx, _identity, _req| async {
//!         Ok::<_, ApiError>(Response::empty(StatusCode::OK))
//!     }),
//! );
//!
//! let matched = routes.resolve(&Method::GET, "/addresses/7").unwrap();
//! assert_eq!(matched.param("id"), Some("7"));
//! assert_eq!(matched.route().allowed(), RoleSet::ADMIN_TIER);
//! ```

use gatehouse_core::{Handler, RoleSet};
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// A segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

fn parse_segments(pattern: &str) -> Vec<PathSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => PathSegment::Param(name.to_string()),
            None => PathSegment::Literal(s.to_string()),
        })
        .collect()
}

/// A registered route.
pub struct Route {
    method: Method,
    pattern: String,
    segments: Vec<PathSegment>,
    allowed: RoleSet,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the pattern the route was registered with.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the roles admitted by this route.
    #[must_use]
    pub const fn allowed(&self) -> RoleSet {
        self.allowed
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if actual.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, value) in self.segments.iter().zip(actual) {
            match segment {
                PathSegment::Literal(expected) if expected != value => return None,
                PathSegment::Literal(_) => {}
                PathSegment::Param(name) => {
                    params.insert(name.clone(), value.to_string());
                }
            }
        }
        Some(params)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("allowed", &self.allowed)
            .finish_non_exhaustive()
    }
}

/// A resolved route with its extracted path parameters.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    route: &'a Route,
    params: HashMap<String, String>,
}

impl<'a> RouteMatch<'a> {
    /// Returns the matched route.
    #[must_use]
    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// Returns a path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Consumes the match, returning the route and its parameters.
    #[must_use]
    pub fn into_parts(self) -> (&'a Route, HashMap<String, String>) {
        (self.route, self.params)
    }
}

/// Ordered set of routes. The first registered match wins.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route, builder style.
    #[must_use]
    pub fn route(
        mut self,
        method: Method,
        pattern: &str,
        allowed: RoleSet,
        handler: impl Handler,
    ) -> Self {
        self.add(method, pattern, allowed, Arc::new(handler));
        self
    }

    /// Registers a route with a shared handler.
    pub fn add(&mut self, method: Method, pattern: &str, allowed: RoleSet, handler: Arc<dyn Handler>) {
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            segments: parse_segments(pattern),
            allowed,
            handler,
        });
    }

    /// Appends every route of `other`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.routes.extend(other.routes);
        self
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Finds the first route matching `method` and `path`.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route
                    .match_path(path)
                    .map(|params| RouteMatch { route, params })
            })
    }
}
