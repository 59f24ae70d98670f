//! Decode-then-encode to WebP.
//!
//! The source format is sniffed from the bytes by the `image` crate; the
//! decoded raster is expanded to RGBA8 at its natural dimensions and handed
//! to libwebp's lossy encoder.

use thiserror::Error;

use crate::runtime::config::Quality;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The bytes are not an image in any supported format.
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// libwebp rejected the raster (e.g. dimensions above 16383).
    #[error("webp encoding failed: {0}")]
    Encode(String),
}

/// Re-encode `data` as lossy WebP at `quality`.
pub fn encode_webp(data: &[u8], quality: Quality) -> Result<Vec<u8>, EncodeError> {
    let image = image::load_from_memory(data).map_err(|e| EncodeError::Decode(e.to_string()))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::EmptyImage { width, height });
    }

    // libwebp takes quality on 0..=100, i.e. the fraction scaled by 100.
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), width, height);
    let encoded = encoder
        .encode_simple(false, quality.as_fraction() * 100.0)
        .map_err(|e| EncodeError::Encode(format!("{e:?}")))?;
    Ok(encoded.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([12, 180, 90, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("png fixture");
        buf.into_inner()
    }

    #[test]
    fn encodes_png_to_riff_webp() {
        let out = encode_webp(&png_bytes(16, 9), Quality::default()).expect("encode");
        assert_eq!(&out[..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");
    }

    #[test]
    fn output_keeps_natural_dimensions() {
        let out = encode_webp(&png_bytes(21, 7), Quality::new(50).unwrap()).expect("encode");
        let decoded = webp::Decoder::new(&out).decode().expect("webp decodes");
        assert_eq!((decoded.width(), decoded.height()), (21, 7));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = encode_webp(b"definitely not an image", Quality::default()).unwrap_err();
        assert!(matches!(err, EncodeError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let bytes = png_bytes(8, 8);
        let err = encode_webp(&bytes[..bytes.len() / 2], Quality::default()).unwrap_err();
        assert!(matches!(err, EncodeError::Decode(_)));
    }
}
