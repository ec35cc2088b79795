use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::display::DisplayError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No display gateway is installed (degraded mode).
    #[error("display gateway unavailable (degraded mode)")]
    Degraded,
    /// The external platform refused to touch the display artifact.
    #[error("display update forbidden: {0}")]
    DisplayForbidden(String),
    /// The display gateway failed for a reason the engine cannot recover from.
    #[error("display gateway failure")]
    Display(#[source] DisplayError),
    /// Caller lacks the privilege required for the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A target with the same id is already registered.
    #[error("target `{0}` is already registered")]
    DuplicateTarget(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller did not present a valid admin token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The external platform refused the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Degraded => ApiError::ServiceUnavailable("degraded mode".into()),
            ServiceError::DisplayForbidden(detail) => ApiError::Forbidden(detail),
            ServiceError::Display(source) => ApiError::Internal(source.to_string()),
            ServiceError::Unauthorized(message) => ApiError::Unauthorized(message),
            ServiceError::InvalidInput(message) => ApiError::BadRequest(message),
            ServiceError::DuplicateTarget(id) => {
                ApiError::Conflict(format!("target `{id}` is already registered"))
            }
            ServiceError::NotFound(message) => ApiError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
