//! Error types for the library manager

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Rejections produced while checking a payload or a list filter.
///
/// These are always raised before any storage mutation is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required.")]
    MissingTitle,

    #[error("publication_year must be a non-negative integer.")]
    InvalidYear,

    #[error("Invalid status value.")]
    InvalidStatus,

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl ValidationError {
    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingTitle => "missing_title",
            ValidationError::InvalidYear => "invalid_year",
            ValidationError::InvalidStatus => "invalid_status",
            ValidationError::InvalidFilter(_) => "invalid_filter",
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(e) => e.code(),
            AppError::NotFound(_) => "not_found",
            AppError::PermissionDenied(_) => "forbidden",
            AppError::Database(_) => "db_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. `missing_title`)
    pub code: String,
    pub message: String,
    /// HTTP status, repeated for clients that only see the body
    pub status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(e) => {
                tracing::warn!("Rejected payload: {}", e);
                e.to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::PermissionDenied(msg) => {
                tracing::warn!("Permission denied: {}", msg);
                msg.clone()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: self.code().to_string(),
            message,
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
