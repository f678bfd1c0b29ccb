//! Configuration module
//!
//! Process-wide settings are read once at startup from the environment (and an
//! optional `.env` file) and are immutable afterwards. The resulting [`Config`]
//! is passed explicitly to the pipeline and the HTTP layer.

use std::env;
use std::fmt;
use std::str::FromStr;

// Common constants
pub const DEFAULT_JPEG_QUALITY: u8 = 100;
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 500 * 1024 * 1024;
const DEFAULT_PORT: u16 = 5000;

/// Compression method used for entries of the packaged `converted.zip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZipCompression {
    #[default]
    Deflated,
    Stored,
}

impl FromStr for ZipCompression {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deflated" | "deflate" => Ok(ZipCompression::Deflated),
            "stored" | "store" => Ok(ZipCompression::Stored),
            _ => Err(anyhow::anyhow!("Invalid ZIP compression method: {}", s)),
        }
    }
}

impl fmt::Display for ZipCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZipCompression::Deflated => f.write_str("deflated"),
            ZipCompression::Stored => f.write_str("stored"),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// JPEG quality used for every conversion (1-100).
    pub jpeg_quality: u8,
    /// Maximum total size of one upload, in bytes.
    pub max_upload_size: usize,
    pub zip_compression: ZipCompression,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            environment: "development".to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            zip_compression: ZipCompression::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // A missing .env file is fine; real environment variables take precedence.
        let _ = dotenvy::dotenv();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
            jpeg_quality: env::var("JPEG_QUALITY")
                .unwrap_or_else(|_| DEFAULT_JPEG_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JPEG_QUALITY must be a number between 1 and 100"))?,
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE must be a size in bytes"))?,
            zip_compression: env::var("ZIP_COMPRESSION")
                .ok()
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(anyhow::anyhow!(
                "JPEG_QUALITY must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }

        if self.max_upload_size == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE must be greater than zero"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }
}
