//! API error envelope shared by all HTTP handlers.
//!
//! Every failure leaves the service as `{ "success": false, "error": "..." }`
//! with a status code from the fixed taxonomy. Internal detail stays in
//! server-side tracing, never in the response body.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Request-level errors with their HTTP status classification.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request fields; no side effects occurred.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid API key; no side effects occurred.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
