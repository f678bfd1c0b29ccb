//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use webpconv_core::Config;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry().context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment,
        jpeg_quality = config.jpeg_quality,
        zip_compression = %config.zip_compression,
        "Configuration loaded and validated successfully"
    );

    let state = Arc::new(AppState::new(config));
    let router = routes::setup_routes(&state.config, state.clone());

    Ok((state, router))
}
