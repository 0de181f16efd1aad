//! Request context types.
//!
//! The [`RequestContext`] carries the routing data a handler needs: the
//! request ID, the HTTP method and path, matched path parameters and decoded
//! query parameters. The caller's identity is deliberately not stored here;
//! it is passed to handlers as its own argument.

use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use gatehouse_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request routing data handed to domain handlers.
///
/// # Example
///
/// ```
/// use gatehouse_core::{RequestContext, RequestId};
/// use http::Method;
///
/// let ctx = RequestContext::new(RequestId::new(), Method::GET, "/addresses/7")
///     .with_param("id", "7");
/// assert_eq!(ctx.param("id"), Some("7"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
}

impl RequestContext {
    /// Creates a context with no path or query parameters.
    #[must_use]
    pub fn new(request_id: RequestId, method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id,
            method,
            path: path.into(),
            params: HashMap::new(),
            query: Vec::new(),
        }
    }

    /// Creates a context with a fresh request ID. Intended for tests.
    #[must_use]
    pub fn mock(method: Method, path: impl Into<String>) -> Self {
        Self::new(RequestId::new(), method, path)
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a matched path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replaces the path parameters.
    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Parses and attaches a raw query string.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] if the query string is not valid
    /// `application/x-www-form-urlencoded` data.
    pub fn with_query_string(mut self, raw: Option<&str>) -> Result<Self, ApiError> {
        if let Some(raw) = raw {
            self.query = serde_urlencoded::from_str(raw)
                .map_err(|_| ApiError::bad_request("invalid query string"))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn test_request_id_parse() {
        let id = RequestId::new();
        let parsed: RequestId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<RequestId>().is_err());
    }

    #[test]
    fn test_context_params() {
        let ctx = RequestContext::mock(Method::GET, "/addresses/42").with_param("id", "42");
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.path(), "/addresses/42");
        assert_eq!(*ctx.method(), Method::GET);
    }

    #[test]
    fn test_context_query_decoding() {
        let ctx = RequestContext::mock(Method::GET, "/addresses")
            .with_query_string(Some("client_id=12&title=Home%20Base&client_id=99"))
            .unwrap();
        assert_eq!(ctx.query("client_id"), Some("12"));
        assert_eq!(ctx.query("title"), Some("Home Base"));
        assert_eq!(ctx.query("zip"), None);
    }

    #[test]
    fn test_context_without_query() {
        let ctx = RequestContext::mock(Method::GET, "/addresses")
            .with_query_string(None)
            .unwrap();
        assert_eq!(ctx.query("client_id"), None);
    }
}
