//! WebP to JPEG conversion pipeline
//!
//! - File classification by extension (classifier)
//! - In-memory expansion of ZIP, RAR and 7z uploads (archive)
//! - Decoding, transparency flattening and JPEG encoding (converter)
//! - Batch orchestration with per-item error isolation (pipeline)
//! - Single-file or ZIP response packaging (packager)

pub mod archive;
pub mod classifier;
pub mod converter;
pub mod packager;
pub mod pipeline;

pub use archive::{ArchiveEntries, ArchiveEntry, ArchiveError, ArchiveExpander, EntryError};
pub use classifier::{classify, output_name_for, ArchiveKind, FileKind};
pub use converter::{ConversionError, ImageConverter};
pub use packager::{OutputPackager, ARCHIVE_NAME};
pub use pipeline::BatchPipeline;

#[cfg(test)]
mod test_support;
