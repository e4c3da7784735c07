//! Final output encoding.
//!
//! The finished image is encoded losslessly as PNG when possible; if PNG
//! encoding fails the encoder falls back to high-quality JPEG. Only when
//! both formats fail is an error surfaced, and no editor state changes.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use log::warn;
use thiserror::Error;

use crate::decode::Bitmap;

/// JPEG quality used when PNG encoding is unavailable.
pub const FALLBACK_JPEG_QUALITY: u8 = 95;

/// Errors that can occur while serializing the final output.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match the dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Neither PNG nor the JPEG fallback could serialize the image.
    #[error("Encoding failed in every supported format: png: {png}; jpeg: {jpeg}")]
    AllFormatsFailed { png: String, jpeg: String },
}

/// Container format of an encoded output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    /// Lossless PNG (preferred).
    Png,
    /// High-quality JPEG (fallback).
    Jpeg,
}

/// An encoded final output image.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Pixel dimensions of the encoded image; always exactly the rendered
    /// crop dimensions.
    pub width: u32,
    pub height: u32,
}

/// Encode a rendered bitmap to its output container.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions`/`InvalidPixelData` for malformed
/// input and `EncodeError::AllFormatsFailed` when both encoders fail.
pub fn encode_output(image: &Bitmap) -> Result<EncodedImage, EncodeError> {
    validate(image)?;

    let png_err = match encode_png(image) {
        Ok(bytes) => {
            return Ok(EncodedImage {
                bytes,
                format: OutputFormat::Png,
                width: image.width,
                height: image.height,
            })
        }
        Err(e) => e,
    };

    warn!("PNG encoding failed ({png_err}), falling back to JPEG");
    match encode_jpeg(image, FALLBACK_JPEG_QUALITY) {
        Ok(bytes) => Ok(EncodedImage {
            bytes,
            format: OutputFormat::Jpeg,
            width: image.width,
            height: image.height,
        }),
        Err(jpeg_err) => Err(EncodeError::AllFormatsFailed {
            png: png_err,
            jpeg: jpeg_err,
        }),
    }
}

/// Encode RGB pixels as PNG bytes.
fn encode_png(image: &Bitmap) -> Result<Vec<u8>, String> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = PngEncoder::new(&mut buffer);
    encoder
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| e.to_string())?;
    Ok(buffer.into_inner())
}

/// Encode RGB pixels as JPEG bytes with the given quality (1-100).
fn encode_jpeg(image: &Bitmap, quality: u8) -> Result<Vec<u8>, String> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| e.to_string())?;
    Ok(buffer.into_inner())
}

fn validate(image: &Bitmap) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }
    let expected = (image.width as usize) * (image.height as usize) * 3;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_png() {
        let img = Bitmap::filled(20, 10, [128, 64, 32]);
        let out = encode_output(&img).unwrap();

        assert_eq!(out.format, OutputFormat::Png);
        assert_eq!(out.width, 20);
        assert_eq!(out.height, 10);
        // PNG magic bytes
        assert_eq!(&out.bytes[0..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_encoded_png_round_trips() {
        let mut img = Bitmap::filled(8, 8, [0, 0, 0]);
        img.pixels[0] = 200;
        let out = encode_output(&img).unwrap();

        let decoded = crate::decode::decode_bitmap(&out.bytes).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_encode_zero_dimensions_fails() {
        let img = Bitmap::new(0, 10, vec![]);
        assert!(matches!(
            encode_output(&img),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_short_pixel_buffer_fails() {
        let img = Bitmap {
            width: 10,
            height: 10,
            pixels: vec![0u8; 10],
        };
        assert!(matches!(
            encode_output(&img),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }

    #[test]
    fn test_jpeg_fallback_emits_valid_jpeg() {
        let img = Bitmap::filled(16, 16, [50, 100, 150]);
        let bytes = encode_jpeg(&img, FALLBACK_JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_jpeg_quality_clamped() {
        let img = Bitmap::filled(4, 4, [1, 2, 3]);
        assert!(encode_jpeg(&img, 0).is_ok());
        assert!(encode_jpeg(&img, 255).is_ok());
    }
}
