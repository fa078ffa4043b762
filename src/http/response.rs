//! JSON response envelopes.
//!
//! Every body the gatekeeper produces has the same shape:
//! `{"status", "code"?, "message", "data"}`. Reason codes are stable and
//! machine-readable; internal error detail never leaves the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::admission::RejectReason;

/// Error envelope with an explicit status code.
pub fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "code": code,
            "message": message,
            "data": null,
        })),
    )
        .into_response()
}

/// The envelope for an admission rejection.
pub fn reject(reason: RejectReason) -> Response {
    error(reason.status(), reason.code(), reason.message())
}

/// Success envelope.
pub fn success<T: Serialize>(message: Option<&str>, data: T) -> Response {
    Json(json!({
        "status": "ok",
        "message": message,
        "data": data,
    }))
    .into_response()
}

/// 404 envelope used by the router fallback.
pub fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found.")
}
