//! webpconv Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the conversion pipeline and the HTTP layer.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ZipCompression};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{BatchOutcome, ConversionResult, FailedConversion, PackagedOutput, UploadItem};
