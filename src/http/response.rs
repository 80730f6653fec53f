//! Response helpers.
//!
//! Errors produced by the gateway itself (as opposed to relayed backend
//! responses) are JSON objects with an `error` message and a stable `code`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Build a JSON error response.
pub fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": message, "code": code }))).into_response()
}
