//! webpconv API Library
//!
//! This crate provides the HTTP handlers, error rendering and application setup for
//! the WebP to JPEG conversion service.

pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
