//! RAR expansion.
//!
//! libunrar opens archives by path only, so the upload is written to a private
//! temporary file. Members are decompressed straight into memory; member names
//! are never used to build file system paths.

use bytes::Bytes;
use std::io::Write;
use unrar::error::{Code, UnrarError};
use unrar::Archive;

use super::{normalize_path, ArchiveEntry, ArchiveError, EntryError};
use crate::classifier::{classify, FileKind};

pub(super) fn expand(data: &[u8]) -> Result<Vec<Result<ArchiveEntry, EntryError>>, ArchiveError> {
    let mut staged = tempfile::Builder::new()
        .prefix("webpconv-")
        .suffix(".rar")
        .tempfile()
        .map_err(unavailable)?;
    staged.write_all(data).map_err(unavailable)?;
    staged.flush().map_err(unavailable)?;

    let mut archive = Archive::new(staged.path())
        .open_for_processing()
        .map_err(archive_error)?;

    let mut entries = Vec::new();
    while let Some(header) = archive.read_header().map_err(archive_error)? {
        let entry = header.entry();
        if entry.is_encrypted() {
            return Err(ArchiveError::Encrypted);
        }

        let path = normalize_path(&entry.filename.to_string_lossy());
        if !entry.is_file() || classify(&path) != FileKind::Image {
            archive = header.skip().map_err(archive_error)?;
            continue;
        }

        archive = match header.read() {
            Ok((buffer, rest)) => {
                entries.push(Ok(ArchiveEntry {
                    path,
                    data: Bytes::from(buffer),
                }));
                rest
            }
            Err(e) if is_password_error(&e) => return Err(ArchiveError::Encrypted),
            Err(e) => {
                // The handle is consumed by a failed read; later members are unreachable.
                tracing::debug!(file = %path, error = ?e, "Stopping RAR expansion after unreadable member");
                entries.push(Err(EntryError {
                    path,
                    reason: describe(&e).to_string(),
                }));
                break;
            }
        };
    }

    Ok(entries)
}

fn is_password_error(err: &UnrarError) -> bool {
    matches!(err.code, Code::MissingPassword | Code::BadPassword)
}

fn archive_error(err: UnrarError) -> ArchiveError {
    if is_password_error(&err) {
        ArchiveError::Encrypted
    } else {
        ArchiveError::Corrupted(describe(&err).to_string())
    }
}

/// Client-facing text for an unrar status code.
fn describe(err: &UnrarError) -> &'static str {
    match err.code {
        Code::BadData => "checksum mismatch, data is damaged",
        Code::BadArchive => "not a valid RAR archive",
        Code::UnknownFormat => "unsupported RAR format",
        Code::EndArchive => "unexpected end of archive",
        Code::MissingPassword | Code::BadPassword => "archive is encrypted",
        Code::NoMemory => "not enough memory to unpack",
        Code::EReference => "member refers to data outside this volume",
        _ => "RAR unpacking failed",
    }
}

fn unavailable(err: std::io::Error) -> ArchiveError {
    ArchiveError::UnpackerUnavailable(format!("cannot stage archive: {}", err))
}
