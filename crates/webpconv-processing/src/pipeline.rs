//! Batch pipeline
//!
//! Walks the uploaded items in order: classify → (expand) → convert. Every image
//! that reaches the converter produces exactly one [`ConversionResult`]; failures
//! are recorded and never abort the batch.

use std::time::Instant;

use webpconv_core::{AppError, BatchOutcome, ConversionResult, UploadItem};

use crate::archive::ArchiveExpander;
use crate::classifier::{classify, output_name_for, ArchiveKind, FileKind};
use crate::converter::ImageConverter;

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchPipeline {
    converter: ImageConverter,
}

impl BatchPipeline {
    pub fn new(converter: ImageConverter) -> Self {
        Self { converter }
    }

    /// Convert every image found in `items`.
    ///
    /// # Errors
    /// - `AppError::PayloadTooLarge` if the items together exceed `size_limit`
    ///   bytes. Checked before anything is classified or decoded.
    pub fn run(&self, items: Vec<UploadItem>, size_limit: usize) -> Result<BatchOutcome, AppError> {
        let total_size: usize = items.iter().map(UploadItem::size).sum();
        if total_size > size_limit {
            return Err(AppError::PayloadTooLarge(format!(
                "Upload size of {} bytes exceeds maximum allowed size of {} bytes",
                total_size, size_limit
            )));
        }

        let started = Instant::now();
        let mut outcome = BatchOutcome::new();

        for item in &items {
            match classify(&item.name) {
                FileKind::Unsupported => {
                    tracing::debug!(file = %item.name, "Skipping unsupported file");
                }
                FileKind::Image => {
                    outcome.push(self.convert_one(&item.name, &item.data));
                }
                FileKind::Archive(kind) => {
                    self.convert_archive(&item.name, kind, &item.data, &mut outcome);
                }
            }
        }

        tracing::info!(
            items = items.len(),
            converted = outcome.success_count(),
            failed = outcome.failure_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch conversion finished"
        );

        Ok(outcome)
    }

    fn convert_archive(
        &self,
        archive_name: &str,
        kind: ArchiveKind,
        data: &[u8],
        outcome: &mut BatchOutcome,
    ) {
        let entries = match ArchiveExpander::expand(kind, data) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(file = %archive_name, kind = %kind, reason = %e, "Failed to open archive");
                outcome.push(ConversionResult::failure(archive_name, e.to_string()));
                return;
            }
        };

        for entry in entries {
            match entry {
                Ok(entry) => {
                    // Members are classified again by path; expanders only yield images today.
                    if classify(&entry.path) == FileKind::Image {
                        outcome.push(self.convert_one(&entry.path, &entry.data));
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %e.path, archive = %archive_name, reason = %e.reason, "Failed to read archive entry");
                    outcome.push(ConversionResult::failure(e.path, e.reason));
                }
            }
        }
    }

    fn convert_one(&self, name: &str, data: &[u8]) -> ConversionResult {
        match self.converter.convert(data) {
            Ok(jpeg) => {
                tracing::debug!(file = %name, input_bytes = data.len(), output_bytes = jpeg.len(), "Converted image");
                ConversionResult::Success {
                    output_name: output_name_for(name),
                    data: jpeg,
                }
            }
            Err(e) => {
                tracing::warn!(file = %name, reason = %e, error = ?e, "Failed to convert image");
                ConversionResult::failure(name, e.to_string())
            }
        }
    }
}
