//! Request-level error taxonomy.
//!
//! Infrastructure errors from the counter store are caught inside the
//! security middleware (fail-open); they only reach this type from
//! request-scoped validation paths, where they surface as a generic 500 so
//! store internals never leak to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::store::StoreError;

/// Errors a gatekeeper operation can yield for a single request.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Identifier is blocked or over quota; the 429 itself is the retry signal.
    #[error("too many requests")]
    Blocked,

    /// Abuse threshold reached.
    #[error("suspicious activity detected")]
    SuspiciousActivity,

    /// No valid principal on a protected API call.
    #[error("authentication required")]
    Unauthenticated,

    /// Key lookup found nothing active under the presented value.
    #[error("invalid or inactive API key")]
    InvalidApiKey,

    /// Malformed or missing request parameters.
    #[error("{0}")]
    Validation(String),

    /// Referenced record does not exist (or is not owned by the caller).
    #[error("not found")]
    NotFound,

    /// Store failure inside a request-scoped operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::Blocked => {
                (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").into_response()
            }
            GateError::SuspiciousActivity => {
                (StatusCode::FORBIDDEN, "Suspicious Activity Detected").into_response()
            }
            GateError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Authentication required" })),
            )
                .into_response(),
            GateError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Invalid or inactive API key" })),
            )
                .into_response(),
            GateError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            GateError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "Not found" })),
            )
                .into_response(),
            GateError::Store(e) => {
                tracing::error!(error = %e, "Store error during request handling");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
