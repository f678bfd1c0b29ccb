use bytes::Bytes;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

use super::{mentions_encryption, normalize_path, ArchiveEntry, ArchiveError, EntryError};
use crate::classifier::{classify, FileKind};

pub(super) fn open(data: &[u8]) -> Result<ZipEntries<'_>, ArchiveError> {
    let archive = ZipArchive::new(Cursor::new(data)).map_err(|e| {
        let message = e.to_string();
        if mentions_encryption(&message) {
            ArchiveError::Encrypted
        } else {
            ArchiveError::Corrupted(message)
        }
    })?;

    Ok(ZipEntries { archive, index: 0 })
}

/// Lazily decompressed image members of a ZIP archive.
pub struct ZipEntries<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    index: usize,
}

impl ZipEntries<'_> {
    /// Name and directory flag of a member, read without decompressing it.
    fn describe(&mut self, index: usize) -> Option<(String, bool)> {
        let file = self.archive.by_index_raw(index).ok()?;
        Some((normalize_path(file.name()), file.is_dir()))
    }

    fn read(&mut self, index: usize, path: String) -> Result<ArchiveEntry, EntryError> {
        let mut file = self.archive.by_index(index).map_err(|e| EntryError {
            path: path.clone(),
            reason: entry_error_reason(&e),
        })?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).map_err(|e| EntryError {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(ArchiveEntry {
            path,
            data: Bytes::from(buffer),
        })
    }
}

impl Iterator for ZipEntries<'_> {
    type Item = Result<ArchiveEntry, EntryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.archive.len() {
            let index = self.index;
            self.index += 1;

            let (path, is_dir) = match self.describe(index) {
                Some(described) => described,
                None => {
                    return Some(Err(EntryError {
                        path: format!("entry #{}", index),
                        reason: "unreadable entry header".to_string(),
                    }))
                }
            };

            if is_dir || classify(&path) != FileKind::Image {
                continue;
            }

            return Some(self.read(index, path));
        }
        None
    }
}

fn entry_error_reason(err: &ZipError) -> String {
    match err {
        ZipError::UnsupportedArchive(msg) if mentions_encryption(msg) => {
            "entry is encrypted".to_string()
        }
        other => other.to_string(),
    }
}
