//! Test response wrapper.

use bytes::Bytes;
use gatehouse_core::Response;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::TestError;

/// A fully read response with assertion helpers.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Reads a pipeline response.
    ///
    /// # Errors
    ///
    /// Returns `TestError::BodyRead` if the body cannot be collected.
    pub async fn from_response(response: Response) -> Result<Self, TestError> {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a test response from raw parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `TestError::Json` if the body is not the expected JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `TestError::Json` if the body is not JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected.as_ref(), "header '{name}' mismatch");
        self
    }

    /// Asserts a JSON Content-Type.
    ///
    /// # Panics
    ///
    /// Panics if Content-Type is missing or not JSON.
    #[track_caller]
    pub fn assert_json_content_type(&self) -> &Self {
        let actual = self
            .header_str(header::CONTENT_TYPE.as_str())
            .unwrap_or_else(|| panic!("Content-Type header not found"));
        assert!(
            actual.starts_with("application/json"),
            "expected a JSON Content-Type, got '{actual}'"
        );
        self
    }

    /// Asserts the whole JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or differs.
    #[track_caller]
    pub fn assert_json_eq(&self, expected: &serde_json::Value) -> &Self {
        let actual = self.json_value().unwrap_or_else(|e| panic!("body is not JSON: {e}"));
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts one JSON field addressed by a dotted path such as `items.0.id`.
    ///
    /// # Panics
    ///
    /// Panics if the path is missing or the value differs.
    #[track_caller]
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &serde_json::Value) -> &Self {
        let path = path.as_ref();
        let json = self.json_value().unwrap_or_else(|e| panic!("body is not JSON: {e}"));
        let actual = json_path(&json, path)
            .unwrap_or_else(|| panic!("JSON path '{path}' not found in {json}"));
        assert_eq!(actual, expected, "JSON field '{path}' mismatch");
        self
    }

    /// Asserts a single-message error body: `{"error": message}`.
    ///
    /// # Panics
    ///
    /// Panics if the body is anything else.
    #[track_caller]
    pub fn assert_error(&self, message: &str) -> &Self {
        self.assert_json_eq(&serde_json::json!({ "error": message }))
    }

    /// Asserts a field-error body naming exactly `fields`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the body is not a field-error list or names other fields.
    #[track_caller]
    pub fn assert_field_errors(&self, fields: &[&str]) -> &Self {
        let json = self.json_value().unwrap_or_else(|e| panic!("body is not JSON: {e}"));
        let errors = json
            .get("errors")
            .and_then(serde_json::Value::as_array)
            .unwrap_or_else(|| panic!("expected an errors array, got {json}"));
        let actual: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.get("field").and_then(serde_json::Value::as_str))
            .collect();
        assert_eq!(actual, fields, "field errors mismatch");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(segment)?,
        };
    }
    Some(current)
}
