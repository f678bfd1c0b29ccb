//! Fixture builders shared by the unit tests of this crate.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};

/// Lossless WebP of the given size filled with one colour.
pub(crate) fn webp(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP)
        .unwrap();
    buffer
}

/// ZIP archive holding `entries`; names ending in `/` become directories.
pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }
    buffer
}

/// Names and contents of every file in a ZIP archive, in archive order.
pub(crate) fn read_zip(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            (file.name().to_string(), contents)
        })
        .collect()
}

/// 7z archive holding `entries`, AES-encrypted when `password` is set.
pub(crate) fn build_7z(entries: &[(&str, &[u8])], password: Option<&str>) -> Vec<u8> {
    use sevenz_rust::{AesEncoderOptions, SevenZArchiveEntry, SevenZMethod, SevenZWriter};

    let mut writer = SevenZWriter::new(Cursor::new(Vec::new())).unwrap();
    if let Some(password) = password {
        writer.set_content_methods(vec![
            AesEncoderOptions::new(password.into()).into(),
            SevenZMethod::LZMA2.into(),
        ]);
    }
    for (name, data) in entries {
        let mut entry = SevenZArchiveEntry::new();
        if let Some(dir) = name.strip_suffix('/') {
            entry.name = dir.to_string();
            entry.is_directory = true;
            writer.push_archive_entry::<&[u8]>(entry, None).unwrap();
        } else {
            entry.name = name.to_string();
            entry.has_stream = true;
            writer.push_archive_entry(entry, Some(*data)).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// RAR5 archive with every member stored uncompressed; names ending in `/` are
/// directories.
pub(crate) fn build_rar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    const FILE_HEADER: u64 = 2;
    const HAS_DATA: u64 = 0x0002;
    const IS_DIRECTORY: u64 = 0x0001;
    const HAS_CRC32: u64 = 0x0004;
    const HOST_UNIX: u64 = 1;

    let mut out = b"Rar!\x1a\x07\x01\x00".to_vec();
    // Main archive header: type 1, no flags.
    out.extend(rar_block(&[1, 0, 0]));

    for (name, data) in entries {
        let mut header = Vec::new();
        push_vint(&mut header, FILE_HEADER);
        match name.strip_suffix('/') {
            Some(dir) => {
                push_vint(&mut header, 0);
                push_vint(&mut header, IS_DIRECTORY);
                push_vint(&mut header, 0);
                push_vint(&mut header, 0o40755);
                push_rar_tail(&mut header, dir, HOST_UNIX);
                out.extend(rar_block(&header));
            }
            None => {
                push_vint(&mut header, HAS_DATA);
                push_vint(&mut header, data.len() as u64);
                push_vint(&mut header, HAS_CRC32);
                push_vint(&mut header, data.len() as u64);
                push_vint(&mut header, 0o100644);
                header.extend(crc32fast::hash(data).to_le_bytes());
                push_rar_tail(&mut header, name, HOST_UNIX);
                out.extend(rar_block(&header));
                out.extend_from_slice(data);
            }
        }
    }

    // End of archive header: type 5, no flags.
    out.extend(rar_block(&[5, 0, 0]));
    out
}

/// Compression info (stored), host OS and name of a RAR5 file header.
fn push_rar_tail(header: &mut Vec<u8>, name: &str, host: u64) {
    push_vint(header, 0);
    push_vint(header, host);
    push_vint(header, name.len() as u64);
    header.extend_from_slice(name.as_bytes());
}

/// CRC32 + size prefix around one RAR5 header body.
fn rar_block(body: &[u8]) -> Vec<u8> {
    let mut sized = Vec::new();
    push_vint(&mut sized, body.len() as u64);
    sized.extend_from_slice(body);

    let mut block = crc32fast::hash(&sized).to_le_bytes().to_vec();
    block.extend(sized);
    block
}

fn push_vint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}
