//! Extension-based file classification.
//!
//! Classification never looks at file contents: a file named `*.webp` is always
//! treated as an image and only fails later, at decode time, if it is not one.

use std::fmt;

/// Supported archive containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    Rar,
    SevenZip,
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveKind::Zip => f.write_str("zip"),
            ArchiveKind::Rar => f.write_str("rar"),
            ArchiveKind::SevenZip => f.write_str("7z"),
        }
    }
}

/// What the pipeline should do with an uploaded or archived file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Image,
    Archive(ArchiveKind),
    Unsupported,
}

/// Classify a file by the extension of its base name, case-insensitively.
pub fn classify(name: &str) -> FileKind {
    let lower = base_name(name).to_ascii_lowercase();
    let extension = match lower.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return FileKind::Unsupported,
    };

    match extension {
        "webp" => FileKind::Image,
        "zip" => FileKind::Archive(ArchiveKind::Zip),
        "rar" => FileKind::Archive(ArchiveKind::Rar),
        "7z" => FileKind::Archive(ArchiveKind::SevenZip),
        _ => FileKind::Unsupported,
    }
}

/// Last path component of `path`. Both `/` and `\` count as separators.
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Output file name for an image: base name with its extension replaced by `.jpg`.
///
/// A name whose only dot is the leading one (`.webp`) has no stem to keep, so the
/// whole base name is kept and `.jpg` appended.
pub fn output_name_for(path: &str) -> String {
    let base = base_name(path);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    format!("{}.jpg", stem)
}
