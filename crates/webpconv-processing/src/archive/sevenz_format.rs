use bytes::Bytes;
use sevenz_rust::{Password, SevenZReader};
use std::io::{self, Cursor, Read};

use super::{mentions_encryption, normalize_path, ArchiveEntry, ArchiveError, EntryError};
use crate::classifier::{classify, FileKind};

pub(super) fn expand(data: &[u8]) -> Result<Vec<Result<ArchiveEntry, EntryError>>, ArchiveError> {
    let mut reader = SevenZReader::new(Cursor::new(data), data.len() as u64, Password::empty())
        .map_err(map_error)?;

    let mut entries = Vec::new();
    reader
        .for_each_entries(|entry, content| {
            let path = normalize_path(entry.name());
            if entry.is_directory() || classify(&path) != FileKind::Image {
                // Solid blocks are decoded sequentially; skipped members must still be consumed.
                io::copy(content, &mut io::sink())?;
                return Ok(true);
            }

            let mut buffer = Vec::new();
            match content.read_to_end(&mut buffer) {
                Ok(_) => entries.push(Ok(ArchiveEntry {
                    path,
                    data: Bytes::from(buffer),
                })),
                Err(e) => entries.push(Err(EntryError {
                    path,
                    reason: e.to_string(),
                })),
            }
            Ok(true)
        })
        .map_err(map_error)?;

    Ok(entries)
}

fn map_error(err: sevenz_rust::Error) -> ArchiveError {
    let message = err.to_string();
    if mentions_encryption(&message) {
        ArchiveError::Encrypted
    } else {
        ArchiveError::Corrupted(message)
    }
}
