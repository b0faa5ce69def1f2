use crate::AppState;
use crate::api::error::AppError;
use crate::services::storage::StorageError;
use crate::utils::id::generate_file_id;
use crate::utils::validation::{
    ValidationError, stored_file_name, validate_declared_size, validate_mime_type,
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode, header},
};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::StreamReader;

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub url: String,
}

/// `POST /upload`
///
/// Authentication has already happened in `require_api_key`. This checks the
/// declared size, then the `image` field's type, and streams it to storage.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let max_size = state.config.max_upload_size;

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    validate_declared_size(declared, max_size).inspect_err(|_| {
        tracing::warn!("File too large: declared {:?} bytes", declared);
    })?;

    let mut multipart =
        multipart.map_err(|e| AppError::Internal(format!("Invalid multipart request: {}", e)))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let mime = validate_mime_type(field.content_type()).inspect_err(|_| {
            tracing::warn!("Unsupported file type: {:?}", field.content_type());
        })?;

        let stored_name = stored_file_name(&generate_file_id(), field.file_name());

        let body_with_io_error = field.map_err(std::io::Error::other);
        let reader = StreamReader::new(body_with_io_error);

        let size = state
            .storage
            .put_stream(&stored_name, Box::new(reader))
            .await
            .map_err(|e| match e {
                StorageError::Io(io) if exceeded_body_limit(&io) => too_large(max_size),
                other => other.into(),
            })?;

        tracing::info!(
            "File uploaded successfully: {} ({}, {} bytes)",
            stored_name,
            mime,
            size
        );

        return Ok(Json(UploadResponse {
            url: state.config.public_url(&stored_name),
        }));
    }

    tracing::warn!("Upload request without an '{}' field", IMAGE_FIELD);
    Err(ValidationError::UnsupportedType { declared: None }.into())
}

fn too_large(max_size: usize) -> AppError {
    ValidationError::FileTooLarge {
        declared: None,
        max: max_size,
    }
    .into()
}

fn multipart_error(e: MultipartError, max_size: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_size)
    } else {
        AppError::Internal(format!("Malformed multipart body: {}", e))
    }
}

/// Whether a streaming failure came from the request body limit.
fn exceeded_body_limit(e: &std::io::Error) -> bool {
    e.get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
        .is_some_and(|m| m.status() == StatusCode::PAYLOAD_TOO_LARGE)
}
