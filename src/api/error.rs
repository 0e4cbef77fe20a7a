//! API error types with structured JSON responses.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::pipeline::ingest::IngestError;
use crate::search::SearchError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No file was sent with the request")]
    MissingFile,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("File too large: {0}")]
    FileTooLarge(String),
    #[error("Insufficient text: {0}")]
    InsufficientText(String),
    #[error("A search term is required")]
    MissingQuery,
    #[error("Validation failed")]
    Validation { details: HashMap<String, String> },
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "MISSING_FILE",
                "No file was sent with the request".to_string(),
            ),
            ApiError::UnsupportedFormat(detail) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT", detail)
            }
            ApiError::FileTooLarge(detail) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE", detail)
            }
            ApiError::InsufficientText(detail) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_TEXT", detail)
            }
            ApiError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                "MISSING_QUERY",
                "The 'q' query parameter is required".to_string(),
            ),
            ApiError::Validation { details: fields } => {
                details = Some(fields);
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION",
                    "The document failed validation".to_string(),
                )
            }
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROCESSING",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingFile => ApiError::MissingFile,
            IngestError::UnsupportedFormat { .. } => ApiError::UnsupportedFormat(err.to_string()),
            IngestError::FileTooLarge { .. } => ApiError::FileTooLarge(err.to_string()),
            IngestError::InsufficientText { .. } => ApiError::InsufficientText(err.to_string()),
            IngestError::Validation { field, message } => ApiError::Validation {
                details: HashMap::from([(field, message)]),
            },
            IngestError::Processing(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::MissingQuery => ApiError::MissingQuery,
            SearchError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
