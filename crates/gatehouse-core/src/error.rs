//! Error types for Gatehouse.
//!
//! Every failure produced by a pipeline stage or a handler is an [`ApiError`].
//! The enum is closed: the error normalizer matches it exhaustively and turns
//! it into exactly one [`WireError`] body and one status code.
//!
//! | Variant | Status | Wire body |
//! |---|---|---|
//! | `BadRequest` | 400 | `{"error": message}` |
//! | `Unauthorized` | 401 | `{"error": "unauthorized"}` |
//! | `Forbidden` | 403 | `{"error": "forbidden"}` |
//! | `NotFound` | 404 | `{"error": message}` |
//! | `Validation` | 422 | `{"errors": [{"field", "message"}, ...]}` |
//! | `Internal` | 500 | `{"error": "internal server error"}` |

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Response, ResponseExt};

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Message sent to clients for every internal failure.
pub const INTERNAL_MESSAGE: &str = "internal server error";

const FALLBACK_BODY: &[u8] = br#"{"error":"internal server error"}"#;

/// Terminal classification of a request's error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed request body or parameters.
    BadRequest,
    /// Missing or rejected credential.
    Unauthorized,
    /// Identity lacks the required role.
    Forbidden,
    /// Unknown route or missing record.
    NotFound,
    /// One or more field constraints failed.
    ValidationFailed,
    /// Anything else, including recovered panics.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable name for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ValidationFailed => "validation_failed",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending field as it appears on the wire.
    pub field: String,
    /// Constraint tag, e.g. `required` or `max`. Logged, never serialized.
    pub constraint: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// Ordered collection of field violations.
///
/// # Example
///
/// ```
/// use gatehouse_core::FieldViolations;
///
/// let mut violations = FieldViolations::new();
/// violations.push("title", "required", "title is required");
/// assert_eq!(violations.len(), 1);
/// assert!(violations.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldViolations(Vec<FieldViolation>);

impl FieldViolations {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a violation, preserving insertion order.
    pub fn push(
        &mut self,
        field: impl Into<String>,
        constraint: &'static str,
        message: impl Into<String>,
    ) {
        self.0.push(FieldViolation {
            field: field.into(),
            constraint,
            message: message.into(),
        });
    }

    /// Returns `true` when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over violations in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldViolation> {
        self.0.iter()
    }

    /// Converts the collection into `Ok(())` when empty, or
    /// [`ApiError::Validation`] otherwise.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldViolations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{} ({})", violation.field, violation.constraint)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldViolations {
    type Item = &'a FieldViolation;
    type IntoIter = std::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Standard error type for Gatehouse.
///
/// # Example
///
/// ```
/// use gatehouse_core::{ApiError, ErrorKind};
///
/// let err = ApiError::bad_request("invalid request body");
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
/// assert_eq!(err.status_code().as_u16(), 400);
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be decoded.
    #[error("bad request: {message}")]
    BadRequest {
        /// Message returned to the client.
        message: String,
    },

    /// No valid credential was presented.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller's role is not admitted by the route.
    #[error("forbidden")]
    Forbidden,

    /// The route or record does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Message returned to the client.
        message: String,
    },

    /// Field constraints failed.
    #[error("validation failed: {0}")]
    Validation(FieldViolations),

    /// An unexpected failure. The source is logged, never serialized.
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary failure as an internal error.
    #[must_use]
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::Internal(source.into())
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationFailed,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status()
    }

    /// Builds the client-facing body. Internal detail is never included.
    #[must_use]
    pub fn to_wire(&self) -> WireError {
        match self {
            Self::BadRequest { message } | Self::NotFound { message } => WireError::Single {
                error: message.clone(),
            },
            Self::Unauthorized => WireError::Single {
                error: "unauthorized".to_string(),
            },
            Self::Forbidden => WireError::Single {
                error: "forbidden".to_string(),
            },
            Self::Validation(violations) => WireError::Fields {
                errors: violations
                    .iter()
                    .map(|v| WireFieldError {
                        field: v.field.clone(),
                        message: v.message.clone(),
                    })
                    .collect(),
            },
            Self::Internal(_) => WireError::Single {
                error: INTERNAL_MESSAGE.to_string(),
            },
        }
    }

    /// Serializes this error into its HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::to_vec(&self.to_wire())
            .map_or_else(|_| Bytes::from_static(FALLBACK_BODY), Bytes::from);
        Response::json_bytes(status, body)
    }
}

/// Normalized failure body sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireError {
    /// A list of field-level errors.
    Fields {
        /// Violations in the order they were found.
        errors: Vec<WireFieldError>,
    },
    /// A single-cause error.
    Single {
        /// Human-readable message.
        error: String,
    },
}

/// One entry of [`WireError::Fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFieldError {
    /// Field name.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}
