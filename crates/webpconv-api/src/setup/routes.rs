use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use webpconv_core::Config;

use crate::handlers::{convert::convert, health::liveness_check, index::index};
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file payload.
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Largest request body accepted before any handler runs.
pub fn request_body_limit(config: &Config) -> usize {
    config.max_upload_size.saturating_add(MULTIPART_OVERHEAD)
}

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let body_limit = request_body_limit(config);
    tracing::debug!(body_limit, "Request body limit configured");

    Router::new()
        .route("/", get(index))
        .route("/convert", post(convert))
        .route("/health", get(liveness_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}
