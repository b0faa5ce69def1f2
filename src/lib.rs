pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::retention::RetentionSweeper;
use crate::services::storage::StorageService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{MethodRouter, get, post},
};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageService>,
    pub sweeper: Arc<RetentionSweeper>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn StorageService>) -> Self {
        let sweeper = Arc::new(RetentionSweeper::from_config(storage.clone(), &config));
        Self {
            config: Arc::new(config),
            storage,
            sweeper,
        }
    }
}

/// Permissive cross-origin headers for one route. Preflights are answered by
/// `CorsLayer`; every other response also lists the allowed methods and headers.
fn with_cors(
    route: MethodRouter<AppState>,
    methods: [Method; 2],
    listed: &'static str,
) -> MethodRouter<AppState> {
    route
        .layer::<_, Infallible>(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(listed),
        ))
        .layer::<_, Infallible>(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(methods)
                .allow_headers([header::CONTENT_TYPE]),
        )
}

pub fn create_app(state: AppState) -> Router {
    // Route layers run bottom to top: sweep trigger, auth, body limit, handler.
    let upload = post(api::handlers::files::upload_image)
        .route_layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::require_api_key,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::retention::sweep_on_upload,
        ))
        .fallback(api::handlers::not_found);

    let download = get(api::handlers::files::download_upload).fallback(api::handlers::not_found);

    let (upload, download) = if state.config.enable_cors {
        (
            with_cors(upload, [Method::POST, Method::OPTIONS], "POST, OPTIONS"),
            with_cors(download, [Method::GET, Method::OPTIONS], "GET, OPTIONS"),
        )
    } else {
        (upload, download)
    };

    Router::new()
        .route("/upload", upload)
        .route("/uploads/*path", download)
        .fallback(api::handlers::not_found)
        .layer(from_fn(
            api::middleware::request_id::request_id_middleware,
        ))
        .with_state(state)
}
