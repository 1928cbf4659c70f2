//! Error taxonomy for the listing API
//!
//! Every handler returns `Result<_, ApiError>`; failures are converted into
//! the uniform JSON envelope `{"success": false, "message": ...}`. Internal
//! details of storage failures are logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failure modes surfaced by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required input (400)
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or insufficient credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// No record for the given id (404)
    #[error("{0}")]
    NotFound(&'static str),

    /// Unexpected persistence failure (500)
    #[error("storage failure: {0}")]
    Storage(#[from] redb::Error),

    /// Record (de)serialization failure (500)
    #[error("serialization failure: {0}")]
    Serde(#[from] serde_json::Error),

    /// File-system failure while handling an uploaded image (500)
    #[error("file storage failure: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed multipart request body (400)
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl From<redb::TransactionError> for ApiError {
    fn from(error: redb::TransactionError) -> Self {
        Self::Storage(error.into())
    }
}

impl From<redb::TableError> for ApiError {
    fn from(error: redb::TableError) -> Self {
        Self::Storage(error.into())
    }
}

impl From<redb::StorageError> for ApiError {
    fn from(error: redb::StorageError) -> Self {
        Self::Storage(error.into())
    }
}

impl From<redb::CommitError> for ApiError {
    fn from(error: redb::CommitError) -> Self {
        Self::Storage(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Serde(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal failures keep their detail in the log only.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "success": false,
                "message": message
            })),
        )
            .into_response()
    }
}
