//! Image converter - decode, flatten transparency, encode as JPEG

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::io::Cursor;
use webpconv_core::config::DEFAULT_JPEG_QUALITY;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid or corrupted image")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode JPEG")]
    Encode(#[source] image::ImageError),
}

/// Converts a single image into a JPEG.
///
/// Stateless apart from the quality setting, so one instance can be shared by
/// every request.
#[derive(Debug, Clone, Copy)]
pub struct ImageConverter {
    quality: u8,
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageConverter {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Decode `data`, flatten it onto white and re-encode it as JPEG.
    pub fn convert(&self, data: &[u8]) -> Result<Bytes, ConversionError> {
        let img = Self::decode(data)?;
        let rgb = Self::flatten(img);
        self.encode(&rgb)
    }

    fn decode(data: &[u8]) -> Result<DynamicImage, ConversionError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ConversionError::Decode(image::ImageError::IoError(e)))?;
        reader.decode().map_err(ConversionError::Decode)
    }

    /// Composite images carrying alpha onto an opaque white background.
    ///
    /// Opaque images are only widened to 8-bit RGB; their pixel values are kept.
    pub fn flatten(img: DynamicImage) -> RgbImage {
        if !img.color().has_alpha() {
            return img.into_rgb8();
        }

        let rgba = img.into_rgba8();
        RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            Rgb([
                blend_on_white(r, a),
                blend_on_white(g, a),
                blend_on_white(b, a),
            ])
        })
    }

    fn encode(&self, rgb: &RgbImage) -> Result<Bytes, ConversionError> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(ConversionError::Encode)?;
        Ok(Bytes::from(buffer))
    }
}

fn blend_on_white(channel: u8, alpha: u8) -> u8 {
    let c = channel as u32;
    let a = alpha as u32;
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
