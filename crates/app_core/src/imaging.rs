//! Image decoding for cards, the lightbox and upload previews

use crate::AppError;
use image::{GenericImageView, ImageReader};
use std::io::Cursor;
use std::sync::Arc;

/// Decoded RGBA8 pixels ready for texture upload
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

impl DecodedImage {
    /// Height over width, used by the masonry layout
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            1.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// Decode `bytes`, downscaling so neither edge exceeds `max_edge`
pub fn decode_rgba(bytes: &[u8], max_edge: u32) -> Result<DecodedImage, AppError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::ImageDecode(e.to_string()))?;

    if reader.format().is_none() {
        return Err(AppError::UnsupportedFormat("unrecognized image data".into()));
    }

    let img = reader.decode()?;

    let img = {
        let (w, h) = img.dimensions();
        if max_edge > 0 && (w > max_edge || h > max_edge) {
            img.thumbnail(max_edge, max_edge)
        } else {
            img
        }
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw().into(),
    })
}

/// File extension matching the sniffed format of `bytes`
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_small_image_keeps_size() {
        let decoded = decode_rgba(&png(8, 4), 1600).unwrap();
        assert_eq!((decoded.width, decoded.height), (8, 4));
        assert_eq!(decoded.rgba.len(), 8 * 4 * 4);
        assert_eq!(decoded.aspect(), 0.5);
    }

    #[test]
    fn test_decode_downscales() {
        let decoded = decode_rgba(&png(64, 32), 16).unwrap();
        assert!(decoded.width <= 16 && decoded.height <= 16);
        assert_eq!(decoded.width, 16);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_rgba(b"definitely not an image", 100).is_err());
    }

    #[test]
    fn test_sniff_extension() {
        assert_eq!(sniff_extension(&png(1, 1)), Some("png"));
        assert_eq!(sniff_extension(b"plain text"), None);
    }
}
