//! Liveness endpoint answered ahead of the pipeline.

use bytes::Bytes;
use gatehouse_core::{Response, ResponseExt};
use http::{Method, StatusCode};

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

const OK_BODY: &[u8] = br#"{"status":"ok"}"#;
const DRAINING_BODY: &[u8] = br#"{"status":"draining"}"#;

/// Returns `true` if the request targets the liveness endpoint.
#[must_use]
pub fn is_health_check(method: &Method, path: &str) -> bool {
    *method == Method::GET && path == HEALTH_PATH
}

/// Builds the liveness response.
#[must_use]
pub fn health_response(draining: bool) -> Response {
    if draining {
        Response::json_bytes(
            StatusCode::SERVICE_UNAVAILABLE,
            Bytes::from_static(DRAINING_BODY),
        )
    } else {
        Response::json_bytes(StatusCode::OK, Bytes::from_static(OK_BODY))
    }
}
