pub mod files;

use axum::http::StatusCode;

/// Anything without a route: 404 with an empty body.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
