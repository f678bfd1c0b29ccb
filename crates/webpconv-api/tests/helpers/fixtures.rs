//! Test fixtures: in-memory WebP images and ZIP archives.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Lossless WebP of the given size filled with one RGBA colour.
pub fn create_test_webp(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::WebP)
        .expect("Failed to encode WebP fixture");
    buf
}

/// Bytes that carry a `.webp` name but are not an image.
pub fn create_corrupt_webp() -> Vec<u8> {
    b"RIFF\x00\x00\x00\x00WEBPnot really an image".to_vec()
}

/// ZIP archive holding the given `(path, bytes)` members in order.
pub fn create_test_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        for (path, data) in entries {
            if path.ends_with('/') {
                zip.add_directory(*path, FileOptions::default())
                    .expect("Failed to add directory");
            } else {
                zip.start_file(*path, FileOptions::default())
                    .expect("Failed to start file");
                zip.write_all(data).expect("Failed to write file");
            }
        }
        zip.finish().expect("Failed to finish ZIP");
    }
    buf
}

/// Names and contents of every member of a ZIP, in archive order.
pub fn read_zip_entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(data)).expect("Response is not a ZIP");
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).expect("Failed to read ZIP member");
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)
                .expect("Failed to read ZIP member data");
            (file.name().to_string(), contents)
        })
        .collect()
}

pub fn mime_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "webp" => "image/webp",
        Some(ext) if ext == "zip" => "application/zip",
        Some(ext) if ext == "rar" => "application/vnd.rar",
        Some(ext) if ext == "7z" => "application/x-7z-compressed",
        _ => "application/octet-stream",
    }
}
