//! Request body and parameter extraction.
//!
//! Handlers decode their inputs through these helpers so every decode failure
//! becomes [`ApiError::BadRequest`] and every constraint failure becomes
//! [`ApiError::Validation`].

use serde::de::DeserializeOwned;
use std::ops::Deref;
use std::str::FromStr;

use crate::{ApiError, FieldViolations, Request, RequestContext};

/// Message returned when the body is not the expected JSON document.
pub const INVALID_BODY: &str = "invalid request body";

/// Field-level validation for decoded request bodies.
///
/// Implementations push one violation per failed rule, in field order.
///
/// # Example
///
/// ```
/// use gatehouse_core::{FieldViolations, Validate};
///
/// struct Rename { name: String }
///
/// impl Validate for Rename {
///     fn validate(&self, violations: &mut FieldViolations) {
///         if self.name.trim().is_empty() {
///             violations.push("name", "required", "name is required");
///         }
///     }
/// }
///
/// let mut violations = FieldViolations::new();
/// Rename { name: " ".into() }.validate(&mut violations);
/// assert_eq!(violations.len(), 1);
/// ```
pub trait Validate {
    /// Records every failed constraint.
    fn validate(&self, violations: &mut FieldViolations);

    /// Runs [`Validate::validate`] and converts the outcome into a result.
    fn check(&self) -> Result<(), ApiError> {
        let mut violations = FieldViolations::new();
        self.validate(&mut violations);
        violations.into_result()
    }
}

/// A decoded JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the wrapper and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Decodes the request body as JSON.
///
/// An empty body is a decode failure.
pub fn json<T: DeserializeOwned>(request: &Request) -> Result<Json<T>, ApiError> {
    serde_json::from_slice(request.body())
        .map(Json)
        .map_err(|e| {
            tracing::debug!(error = %e, "Request body failed to decode");
            ApiError::bad_request(INVALID_BODY)
        })
}

/// Decodes the request body as JSON and validates it.
pub fn validated_json<T>(request: &Request) -> Result<Json<T>, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let body = json::<T>(request)?;
    body.check()?;
    Ok(body)
}

/// Parses a path parameter, failing with `message` when it is missing or
/// does not parse.
pub fn path_param<T: FromStr>(
    ctx: &RequestContext,
    name: &str,
    message: &'static str,
) -> Result<T, ApiError> {
    ctx.param(name)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| ApiError::bad_request(message))
}
