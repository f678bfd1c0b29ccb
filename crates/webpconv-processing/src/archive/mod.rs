//! In-memory archive expansion
//!
//! Turns an uploaded archive into a single forward pass over the images it
//! contains. Directories and non-image members are skipped; nested folders are
//! flattened into `/`-separated relative paths.

mod rar_format;
mod sevenz_format;
mod zip_format;

use bytes::Bytes;

use crate::classifier::ArchiveKind;

pub use zip_format::ZipEntries;

/// An image member of an archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path relative to the archive root, `/`-separated.
    pub path: String,
    pub data: Bytes,
}

/// The archive as a whole could not be expanded.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive is corrupted or unreadable: {0}")]
    Corrupted(String),

    #[error("archive is encrypted")]
    Encrypted,

    #[error("RAR unpacking is unavailable: {0}")]
    UnpackerUnavailable(String),
}

/// A single member could not be read; the rest of the archive is still usable.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{path}: {reason}")]
pub struct EntryError {
    pub path: String,
    pub reason: String,
}

/// Image members of one archive, in the archive's own order.
///
/// ZIP members are decompressed one per call to `next`. 7z decoding is callback
/// driven and the RAR handle lives on a temporary file, so their members are
/// collected up front.
pub enum ArchiveEntries<'a> {
    Zip(ZipEntries<'a>),
    Buffered(std::vec::IntoIter<Result<ArchiveEntry, EntryError>>),
}

impl Iterator for ArchiveEntries<'_> {
    type Item = Result<ArchiveEntry, EntryError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ArchiveEntries::Zip(entries) => entries.next(),
            ArchiveEntries::Buffered(entries) => entries.next(),
        }
    }
}

pub struct ArchiveExpander;

impl ArchiveExpander {
    pub fn expand(kind: ArchiveKind, data: &[u8]) -> Result<ArchiveEntries<'_>, ArchiveError> {
        tracing::debug!(kind = %kind, size = data.len(), "Expanding archive");
        match kind {
            ArchiveKind::Zip => zip_format::open(data).map(ArchiveEntries::Zip),
            ArchiveKind::SevenZip => {
                sevenz_format::expand(data).map(|entries| ArchiveEntries::Buffered(entries.into_iter()))
            }
            ArchiveKind::Rar => {
                rar_format::expand(data).map(|entries| ArchiveEntries::Buffered(entries.into_iter()))
            }
        }
    }
}

/// Normalize a member path to `/` separators without leading `./` or `/`.
pub(crate) fn normalize_path(name: &str) -> String {
    let normalized = name.replace('\\', "/");
    let mut trimmed = normalized.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Heuristic used by decoders that only report encryption through their messages.
fn mentions_encryption(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("password") || lower.contains("encrypt") || lower.contains("decrypt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_7z, build_rar, build_zip};

    fn collect_paths_and_data(kind: ArchiveKind, data: &[u8]) -> Vec<(String, Vec<u8>)> {
        ArchiveExpander::expand(kind, data)
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (e.path, e.data.to_vec())
            })
            .collect()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("a/b/c.webp"), "a/b/c.webp");
        assert_eq!(normalize_path("a\\b\\c.webp"), "a/b/c.webp");
        assert_eq!(normalize_path("./a/c.webp"), "a/c.webp");
        assert_eq!(normalize_path("/abs/c.webp"), "abs/c.webp");
        assert_eq!(normalize_path("././/c.webp"), "c.webp");
    }

    #[test]
    fn test_zip_skips_directories_and_non_images() {
        let data = build_zip(&[
            ("top.webp", b"one"),
            ("docs/", b""),
            ("docs/readme.txt", b"text"),
            ("nested/deeper/inner.WEBP", b"two"),
            ("nested/other.png", b"png"),
            ("inner.zip", b"zip"),
        ]);

        let entries: Vec<_> = ArchiveExpander::expand(ArchiveKind::Zip, &data)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["top.webp", "nested/deeper/inner.WEBP"]);
        assert_eq!(&entries[0].data[..], b"one");
        assert_eq!(&entries[1].data[..], b"two");
    }

    #[test]
    fn test_zip_preserves_archive_order() {
        let data = build_zip(&[
            ("z.webp", b"z"),
            ("a/b.webp", b"b"),
            ("m.webp", b"m"),
        ]);

        let paths: Vec<_> = ArchiveExpander::expand(ArchiveKind::Zip, &data)
            .unwrap()
            .map(|e| e.unwrap().path)
            .collect();
        assert_eq!(paths, vec!["z.webp", "a/b.webp", "m.webp"]);
    }

    #[test]
    fn test_zip_without_images_is_empty() {
        let data = build_zip(&[("readme.txt", b"hello")]);
        let mut entries = ArchiveExpander::expand(ArchiveKind::Zip, &data).unwrap();
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_corrupted_zip_fails_whole_archive() {
        let result = ArchiveExpander::expand(ArchiveKind::Zip, b"definitely not a zip");
        assert!(matches!(result, Err(ArchiveError::Corrupted(_))));
    }

    #[test]
    fn test_corrupted_7z_fails_whole_archive() {
        let result = ArchiveExpander::expand(ArchiveKind::SevenZip, b"definitely not a 7z");
        assert!(result.is_err());
    }

    #[test]
    fn test_7z_skips_directories_and_non_images_in_order() {
        let data = build_7z(
            &[
                ("album/", b""),
                ("album/deep/a.webp", b"aaaa"),
                ("notes.txt", b"text"),
                ("b.WEBP", b"bb"),
            ],
            None,
        );

        assert_eq!(
            collect_paths_and_data(ArchiveKind::SevenZip, &data),
            vec![
                ("album/deep/a.webp".to_string(), b"aaaa".to_vec()),
                ("b.WEBP".to_string(), b"bb".to_vec()),
            ]
        );
    }

    #[test]
    fn test_encrypted_7z_fails_whole_archive() {
        let data = build_7z(&[("a.webp", b"secret pixels")], Some("hunter2"));
        let result = ArchiveExpander::expand(ArchiveKind::SevenZip, &data);
        assert!(matches!(result, Err(ArchiveError::Encrypted)));
    }

    #[test]
    fn test_rar_reads_nested_members_in_order() {
        let data = build_rar(&[
            ("album/", b""),
            ("album/a.webp", b"aaaa"),
            ("album/deep/", b""),
            ("album/deep/c.webp", b"cc"),
            ("readme.txt", b"skip me"),
            ("b.webp", b"b"),
        ]);

        assert_eq!(
            collect_paths_and_data(ArchiveKind::Rar, &data),
            vec![
                ("album/a.webp".to_string(), b"aaaa".to_vec()),
                ("album/deep/c.webp".to_string(), b"cc".to_vec()),
                ("b.webp".to_string(), b"b".to_vec()),
            ]
        );
    }

    #[test]
    fn test_rar_member_names_never_reach_the_file_system() {
        let target = format!("webpconv_escape_{}.webp", std::process::id());
        let name = format!("../../{}", target);
        let data = build_rar(&[(name.as_str(), b"payload")]);

        let entries = collect_paths_and_data(ArchiveKind::Rar, &data);

        assert_eq!(entries.len(), 1);
        assert!(entries[0].0.ends_with(&target));
        assert_eq!(entries[0].1, b"payload".to_vec());
        assert!(!std::env::temp_dir().join(&target).exists());
        assert!(!std::env::temp_dir().join("..").join(&target).exists());
    }

    #[test]
    fn test_corrupted_rar_fails_whole_archive() {
        match ArchiveExpander::expand(ArchiveKind::Rar, b"definitely not a rar") {
            Err(ArchiveError::Corrupted(reason)) => assert!(
                ["not a valid RAR archive", "unsupported RAR format", "RAR unpacking failed"]
                    .contains(&reason.as_str()),
                "unexpected reason: {}",
                reason
            ),
            other => panic!("expected Corrupted, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_mentions_encryption() {
        assert!(mentions_encryption("PasswordRequired"));
        assert!(mentions_encryption("Header is Encrypted"));
        assert!(!mentions_encryption("bad signature"));
    }
}
