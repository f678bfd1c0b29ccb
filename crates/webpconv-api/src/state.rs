//! Application state shared by every handler.

use webpconv_core::Config;
use webpconv_processing::{BatchPipeline, ImageConverter, OutputPackager};

/// Immutable per-process state, held in an `Arc` by the router.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: BatchPipeline,
    pub packager: OutputPackager,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let pipeline = BatchPipeline::new(ImageConverter::new(config.jpeg_quality));
        let packager = OutputPackager::new(config.zip_compression);
        Self {
            config,
            pipeline,
            packager,
        }
    }
}
