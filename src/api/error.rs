use crate::services::storage::StorageError;
use crate::utils::validation::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported Type: {0}")]
    UnsupportedType(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            ValidationError::UnsupportedType { .. } => AppError::UnsupportedType(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::UnsupportedType(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                return StatusCode::NOT_FOUND.into_response();
            }
            AppError::Storage(StorageError::NotFound(name)) => {
                tracing::debug!("Stored file not found: {}", name);
                return StatusCode::NOT_FOUND.into_response();
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
