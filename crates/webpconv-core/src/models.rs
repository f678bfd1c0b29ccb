//! Domain models for one conversion request.

use bytes::Bytes;
use serde::Serialize;

/// A file as received from the client, before classification.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Name as supplied by the client. May contain path separators.
    pub name: String,
    pub data: Bytes,
}

impl UploadItem {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// An image (or whole archive) that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedConversion {
    pub input_name: String,
    pub reason: String,
}

/// Outcome of converting a single image.
#[derive(Debug, Clone)]
pub enum ConversionResult {
    Success { output_name: String, data: Bytes },
    Failure(FailedConversion),
}

impl ConversionResult {
    pub fn failure(input_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConversionResult::Failure(FailedConversion {
            input_name: input_name.into(),
            reason: reason.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }
}

/// Ordered results of a whole batch.
///
/// Top-level items keep their upload order; archive members keep the archive's
/// own iteration order.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    results: Vec<ConversionResult>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ConversionResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[ConversionResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ConversionResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// `(output_name, jpeg)` for every converted image, in order.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &Bytes)> {
        self.results.iter().filter_map(|r| match r {
            ConversionResult::Success { output_name, data } => Some((output_name.as_str(), data)),
            ConversionResult::Failure(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedConversion> {
        self.results.iter().filter_map(|r| match r {
            ConversionResult::Failure(failed) => Some(failed),
            ConversionResult::Success { .. } => None,
        })
    }
}

impl From<Vec<ConversionResult>> for BatchOutcome {
    fn from(results: Vec<ConversionResult>) -> Self {
        Self { results }
    }
}

/// Final response payload for a batch.
#[derive(Debug, Clone)]
pub enum PackagedOutput {
    /// Exactly one image converted: returned as-is.
    SingleFile {
        name: String,
        data: Bytes,
        failures: Vec<FailedConversion>,
    },
    /// Two or more images converted: bundled in a ZIP container.
    Archive {
        name: String,
        data: Bytes,
        converted: usize,
        failures: Vec<FailedConversion>,
    },
}

impl PackagedOutput {
    pub fn name(&self) -> &str {
        match self {
            PackagedOutput::SingleFile { name, .. } | PackagedOutput::Archive { name, .. } => name,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            PackagedOutput::SingleFile { data, .. } | PackagedOutput::Archive { data, .. } => data,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PackagedOutput::SingleFile { .. } => "image/jpeg",
            PackagedOutput::Archive { .. } => "application/zip",
        }
    }

    pub fn converted_count(&self) -> usize {
        match self {
            PackagedOutput::SingleFile { .. } => 1,
            PackagedOutput::Archive { converted, .. } => *converted,
        }
    }

    pub fn failures(&self) -> &[FailedConversion] {
        match self {
            PackagedOutput::SingleFile { failures, .. }
            | PackagedOutput::Archive { failures, .. } => failures,
        }
    }
}
