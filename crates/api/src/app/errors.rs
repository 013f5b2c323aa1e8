use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use thiserror::Error;

use microbank_core::DomainError;

use crate::app::constants::MESSAGE_500;
use crate::app::dto::{ErrorResponseDto, FieldErrors};

/// Failures surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request validation failed")]
    Validation(FieldErrors),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) | ApiError::AlreadyExists(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, message } => {
                ApiError::Validation(FieldErrors::from([(field.to_string(), message)]))
            }
            e @ DomainError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            DomainError::AlreadyExists(msg) => ApiError::AlreadyExists(msg),
            DomainError::Unexpected(msg) => ApiError::Unexpected(msg),
        }
    }
}

/// An [`ApiError`] bound to the request path it happened on.
#[derive(Debug)]
pub struct ApiFailure {
    api_path: String,
    error: ApiError,
}

impl ApiFailure {
    pub fn new(api_path: &str, error: impl Into<ApiError>) -> Self {
        Self {
            api_path: api_path.to_string(),
            error: error.into(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.status_and_log();
        let (error_message, field_errors) = match self.error {
            ApiError::Validation(fields) => ("Request validation failed".to_string(), fields),
            // Internal detail is logged above, never returned.
            ApiError::Unexpected(_) => (MESSAGE_500.to_string(), FieldErrors::new()),
            other => (other.to_string(), FieldErrors::new()),
        };

        let body = ErrorResponseDto {
            api_path: self.api_path,
            status_code: status.as_u16().to_string(),
            error_message,
            timestamp: Utc::now(),
            field_errors,
        };
        (status, Json(body)).into_response()
    }
}

impl ApiFailure {
    fn status_and_log(&self) -> StatusCode {
        let status = self.error.status();
        match &self.error {
            ApiError::Unexpected(detail) => {
                tracing::error!(api_path = %self.api_path, %detail, "request failed unexpectedly");
            }
            other => {
                tracing::warn!(api_path = %self.api_path, status = status.as_u16(), "request rejected: {other}");
            }
        }
        status
    }
}
