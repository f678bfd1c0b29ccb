//! Output packaging: a lone JPEG is returned as-is, several are zipped.

use anyhow::Context;
use bytes::Bytes;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use webpconv_core::{AppError, BatchOutcome, ConversionResult, PackagedOutput, ZipCompression};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// File name of the ZIP returned for multi-image batches.
pub const ARCHIVE_NAME: &str = "converted.zip";

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputPackager {
    compression: ZipCompression,
}

impl OutputPackager {
    pub fn new(compression: ZipCompression) -> Self {
        Self { compression }
    }

    /// Decide the response shape for a finished batch.
    ///
    /// # Errors
    /// - `AppError::NoValidFiles` when nothing was attempted
    /// - `AppError::AllConversionsFailed` when every attempt failed
    pub fn package(&self, outcome: BatchOutcome) -> Result<PackagedOutput, AppError> {
        if outcome.is_empty() {
            return Err(AppError::NoValidFiles);
        }

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for result in outcome.into_results() {
            match result {
                ConversionResult::Success { output_name, data } => {
                    successes.push((output_name, data))
                }
                ConversionResult::Failure(failed) => failures.push(failed),
            }
        }

        match successes.len() {
            0 => Err(AppError::AllConversionsFailed { failures }),
            1 => {
                let (name, data) = successes.remove(0);
                Ok(PackagedOutput::SingleFile {
                    name,
                    data,
                    failures,
                })
            }
            converted => {
                let data = self.build_zip(successes)?;
                tracing::debug!(
                    converted,
                    failed = failures.len(),
                    zip_bytes = data.len(),
                    "Packaged conversions into ZIP"
                );
                Ok(PackagedOutput::Archive {
                    name: ARCHIVE_NAME.to_string(),
                    data,
                    converted,
                    failures,
                })
            }
        }
    }

    fn build_zip(&self, files: Vec<(String, Bytes)>) -> Result<Bytes, AppError> {
        let method = match self.compression {
            ZipCompression::Deflated => CompressionMethod::Deflated,
            ZipCompression::Stored => CompressionMethod::Stored,
        };
        let options = FileOptions::default()
            .compression_method(method)
            .unix_permissions(0o644);

        let mut names = UniqueNames::default();
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for (name, data) in files {
                let unique = names.claim(&name);
                zip.start_file(unique.as_str(), options)
                    .with_context(|| format!("Failed to add file to ZIP: {}", unique))?;
                zip.write_all(&data)
                    .with_context(|| format!("Failed to write file data to ZIP: {}", unique))?;
            }
            zip.finish().context("Failed to finalize ZIP archive")?;
        }

        Ok(Bytes::from(buffer))
    }
}

/// Hands out file names that are unique within one ZIP.
///
/// Comparison ignores ASCII case so that extracting on a case-insensitive file
/// system cannot overwrite anything. Collisions get `_1`, `_2`, ... before the
/// extension.
#[derive(Debug, Default)]
struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_ascii_lowercase()) {
            return name.to_string();
        }

        let (stem, extension) = match name.rfind('.') {
            Some(idx) if idx > 0 => name.split_at(idx),
            _ => (name, ""),
        };

        let mut counter = 1;
        loop {
            let candidate = format!("{}_{}{}", stem, counter, extension);
            if self.taken.insert(candidate.to_ascii_lowercase()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
