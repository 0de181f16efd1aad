//! HTTP types used throughout the pipeline.
//!
//! Requests reach the pipeline with their body already collected, so the
//! request body is plain [`Bytes`]. Responses use `Full<Bytes>` so they can be
//! handed to hyper unchanged.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

use crate::error::ApiError;

/// The HTTP request type seen by every stage and handler.
pub type Request = http::Request<Bytes>;

/// The HTTP response type produced by the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Media type for JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Helpers for building responses without fallible builders.
pub trait ResponseExt {
    /// Creates a response with a JSON body.
    fn json_bytes(status: StatusCode, body: Bytes) -> Response;

    /// Serializes `value` into a JSON response.
    ///
    /// Serialization failure becomes [`ApiError::Internal`].
    fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Response, ApiError>;

    /// Creates a response with no body.
    fn empty(status: StatusCode) -> Response;
}

impl ResponseExt for Response {
    fn json_bytes(status: StatusCode, body: Bytes) -> Response {
        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        response
    }

    fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Response, ApiError> {
        let body = serde_json::to_vec(value).map_err(ApiError::internal)?;
        Ok(Self::json_bytes(status, Bytes::from(body)))
    }

    fn empty(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_sets_content_type() {
        let response = Response::json(StatusCode::CREATED, &serde_json::json!({"id": 1})).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            APPLICATION_JSON
        );
    }

    #[test]
    fn test_empty_response() {
        let response = Response::empty(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }
}
