//! Test request building.

use bytes::Bytes;
use gatehouse_core::Request;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde::Serialize;

use crate::error::TestError;

/// A request ready to be handed to the pipeline.
#[derive(Debug)]
pub struct TestRequest {
    /// HTTP method
    pub method: Method,
    /// Request URI, path and query only
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Bytes,
}

impl TestRequest {
    /// Starts a GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts into the request type the pipeline consumes.
    #[must_use]
    pub fn into_request(self) -> Request {
        let mut request = http::Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.headers_mut() = self.headers;
        request
    }
}

/// Builder for [`TestRequest`].
///
/// Invalid headers or bodies are reported by [`TestRequestBuilder::build`],
/// so calls can be chained without intermediate results.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Sets a header, replacing any previous value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let parsed = HeaderName::try_from(name.as_ref())
            .map_err(|e| TestError::RequestBuild(format!("invalid header name: {e}")))
            .and_then(|name| {
                HeaderValue::try_from(value.as_ref())
                    .map(|value| (name, value))
                    .map_err(|e| TestError::RequestBuild(format!("invalid header value: {e}")))
            });

        match parsed {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(e) => self.fail(e),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and the `application/json` Content-Type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Some(Bytes::from(bytes));
                self.content_type("application/json")
            }
            Err(e) => {
                self.fail(TestError::Json(e));
                self
            }
        }
    }

    /// Builds the test request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building, or an invalid URI.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid URI: {e}")))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }

    fn fail(&mut self, error: TestError) {
        self.error.get_or_insert(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_request() {
        let request = TestRequest::get("/addresses?client_id=3").build().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.uri.path(), "/addresses");
        assert_eq!(request.uri.query(), Some("client_id=3"));
    }

    #[test]
    fn test_bearer_token() {
        let request = TestRequest::get("/addresses/1")
            .bearer_token("gh1.local.abc")
            .build()
            .unwrap();
        assert_eq!(
            request.headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer gh1.local.abc"
        );
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/addresses")
            .json(&json!({"title": "Home"}))
            .build()
            .unwrap();

        assert_eq!(
            request.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(request.body.as_ref(), br#"{"title":"Home"}"#);
    }

    #[test]
    fn test_invalid_header_reported_at_build() {
        let result = TestRequest::get("/").header("bad header", "x").build();
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }

    #[test]
    fn test_into_request() {
        let request = TestRequest::delete("/addresses/9")
            .header("x-request-id", "abc")
            .build()
            .unwrap()
            .into_request();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.uri().path(), "/addresses/9");
        assert_eq!(request.headers().get("x-request-id").unwrap(), "abc");
        assert!(request.body().is_empty());
    }
}
