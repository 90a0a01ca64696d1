//! Response helpers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// `{"status": <status>}`
pub(crate) fn status_only(status: &'static str) -> Response {
    Json(json!({ "status": status })).into_response()
}

/// `{"status": "error", "message": ...}` with the given HTTP status
pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "message": message.into(),
        })),
    )
        .into_response()
}
