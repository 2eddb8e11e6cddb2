//! Response helpers.
//!
//! Error bodies are JSON `{"error": "..."}` with a fixed message per status.
//! Internal detail is logged, never returned.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors a handler can hand back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// `rulesets` query parameter absent or empty.
    MissingRulesets,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingRulesets => (StatusCode::BAD_REQUEST, "rulesets parameter is required"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong"),
        };
        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// 200 with a plain text body.
pub fn text(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
