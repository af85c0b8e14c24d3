//! # Web API Error Types
//!
//! Maps service outcomes onto HTTP responses. Handlers carry no retry logic;
//! a 503 tells the caller to come back later.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::any::Any;
use thiserror::Error;
use tracing::error;

use super::response_types::ErrorResponse;
use crate::error::ClaimServiceError;

/// Seconds suggested to callers in the `Retry-After` header of a 503
pub const RETRY_AFTER_SECONDS: u64 = 5;

/// Web API errors with HTTP status code mappings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Database unavailable: {detail}")]
    ServiceUnavailable { detail: String },

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            detail: detail.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<ClaimServiceError> for ApiError {
    fn from(err: ClaimServiceError) -> Self {
        match err {
            ClaimServiceError::NotFound { .. } => Self::not_found(err.to_string()),
            ClaimServiceError::ServiceUnavailable { detail } => Self::service_unavailable(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.code(), self.to_string()));

        match self {
            Self::ServiceUnavailable { .. } => (
                self.status_code(),
                [(header::RETRY_AFTER, RETRY_AFTER_SECONDS.to_string())],
                body,
            )
                .into_response(),
            _ => (self.status_code(), body).into_response(),
        }
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Response for a handler that panicked; the process keeps serving
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = %detail, "Request handler panicked");
    ApiError::Internal.into_response()
}
