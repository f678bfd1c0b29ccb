//! Test helpers: build the router around a test configuration.
//!
//! Run from workspace root: `cargo test -p webpconv-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::sync::Arc;
use webpconv_api::setup::routes;
use webpconv_api::AppState;
use webpconv_core::Config;

/// Configuration used by most tests: defaults with a small upload limit.
pub fn test_config() -> Config {
    Config {
        max_upload_size: 8 * 1024 * 1024,
        ..Config::default()
    }
}

pub fn setup_test_server() -> TestServer {
    setup_test_server_with(test_config())
}

pub fn setup_test_server_with(config: Config) -> TestServer {
    let state = Arc::new(AppState::new(config));
    let router = routes::setup_routes(&state.config, state.clone());
    TestServer::new(router.into_make_service()).expect("Failed to create test server")
}

/// Multipart form with one `files` part per `(name, bytes)` pair.
pub fn upload_form(files: &[(&str, Vec<u8>)]) -> MultipartForm {
    files.iter().fold(MultipartForm::new(), |form, (name, data)| {
        let part = Part::bytes(bytes::Bytes::from(data.clone()))
            .file_name(name.to_string())
            .mime_type(fixtures::mime_for(name));
        form.add_part("files", part)
    })
}

/// Value of a response header as a string, if present.
pub fn header(response: &axum_test::TestResponse, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
