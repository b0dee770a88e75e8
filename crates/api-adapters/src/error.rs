//! The JSON error envelope: every failure renders as `{"error": "..."}`.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::errors::DomainError;
use serde_json::json;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// Malformed JSON, query string, path segment or multipart body.
    BadRequest(String),
    /// No bearer token on an authenticated route.
    MissingToken,
    /// A bearer token that does not verify.
    InvalidToken,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn parts(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "authentication required".to_owned()),
            ApiError::InvalidToken => (StatusCode::FORBIDDEN, "invalid or expired token".to_owned()),
            ApiError::Domain(err) => match err {
                DomainError::Validation(message) | DomainError::Conflict(message) => {
                    (StatusCode::BAD_REQUEST, message.clone())
                }
                DomainError::InvalidCredentials => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
                DomainError::Internal(detail) => {
                    error!(detail = %detail, "internal error");
                    internal()
                }
            },
        }
    }
}

fn internal() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Response for a handler that panicked.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    error!(panic = detail, "handler panicked");
    let (status, message) = internal();
    (status, Json(json!({ "error": message }))).into_response()
}
