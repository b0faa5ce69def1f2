use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Kicks off a retention sweep for every upload request without waiting for it.
///
/// Runs ahead of authentication and validation, so the file this request
/// may create does not exist yet when the sweep lists the directory.
pub async fn sweep_on_upload(State(state): State<AppState>, req: Request, next: Next) -> Response {
    drop(state.sweeper.spawn());
    next.run(req).await
}
