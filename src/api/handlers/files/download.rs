use crate::AppState;
use crate::api::error::AppError;
use crate::services::storage::StorageError;
use axum::{
    body::Body,
    extract::{Path, State, rejection::PathRejection},
    http::{StatusCode, header},
    response::Response,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::io::ReaderStream;

/// `GET /uploads/*path`
///
/// The path is resolved below the upload directory. Anything that does not
/// decode, is missing or is not a regular file is a 404, as is anything
/// resolving outside the directory.
pub async fn download_upload(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(path) = path.map_err(|e| AppError::NotFound(e.body_text()))?;
    let object = state.storage.open(&path).await?;

    let mut reader = BufReader::new(object.reader);
    let content_type = {
        let head = reader.fill_buf().await.map_err(StorageError::from)?;
        infer::get(head)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
    };

    tracing::debug!("Serving {} ({}, {} bytes)", path, content_type, object.size);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, object.size);

    if let Some(modified) = object.last_modified {
        builder = builder.header(
            header::LAST_MODIFIED,
            modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        );
    }

    builder
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}
