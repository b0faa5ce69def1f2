use crate::AppState;
use crate::api::error::AppError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Rejects requests whose `Authorization` header is not exactly `Bearer <API_KEY>`.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|value| value == state.config.expected_authorization());

    if !authorized {
        tracing::warn!("Unauthorized upload attempt");
        return Err(AppError::Unauthorized(
            "Unauthorized, missing Bearer API_KEY or incorrect value".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
