//! Error types for Swatchbook.
//!
//! Uses thiserror for ergonomic error definitions that integrate
//! with axum's response system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    // Image errors
    #[error("Image access denied: {0}")]
    ImageAccess(String),

    #[error("File too large: max {max_size} bytes")]
    FileTooLarge { max_size: usize },

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 404
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            // 400
            Self::Validation(_) | Self::InvalidInput(_) | Self::InvalidFileType(_) => {
                StatusCode::BAD_REQUEST
            }

            // 403
            Self::ImageAccess(_) => StatusCode::FORBIDDEN,

            // 413
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 500
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::ImageAccess(_) => "IMAGE_ACCESS_DENIED",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidFileType(_) => "INVALID_FILE_TYPE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Other(_) => "UNKNOWN_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<swatchbook_models::ColorError> for Error {
    fn from(err: swatchbook_models::ColorError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<swatchbook_extract::Error> for Error {
    fn from(err: swatchbook_extract::Error) -> Self {
        match err {
            swatchbook_extract::Error::ImageAccess(msg) => Self::ImageAccess(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
