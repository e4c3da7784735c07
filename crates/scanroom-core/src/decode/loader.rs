//! Bitmap loading with EXIF orientation handling.
//!
//! Camera captures arrive with an EXIF orientation tag rather than physically
//! rotated pixels. Loading normalizes the pixels so the rest of the engine
//! only ever sees an upright natural-coordinate bitmap.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{Bitmap, DecodeError};

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Decode an image from raw bytes, applying EXIF orientation correction.
///
/// The format is guessed from the byte content (JPEG and PNG are enabled).
///
/// # Errors
///
/// Returns `DecodeError::CorruptedFile` if the bytes cannot be decoded, and
/// `DecodeError::EmptyImage` if decoding yields a zero-sized image.
pub fn decode_bitmap(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    // Extract EXIF orientation before decoding
    let orientation = extract_orientation(bytes);

    let cursor = Cursor::new(bytes);
    let reader = ImageReader::new(cursor)
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    let bitmap = Bitmap::from_rgb_image(oriented.into_rgb8());

    if bitmap.is_empty() {
        return Err(DecodeError::EmptyImage);
    }
    Ok(bitmap)
}

/// Downscale a bitmap so that its longest edge fits within `max_edge`,
/// preserving aspect ratio. Bitmaps that already fit are returned unchanged.
///
/// Used to derive a preview-sized working copy from a full-resolution capture.
pub fn fit_within(bitmap: &Bitmap, max_edge: u32) -> Result<Bitmap, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::EmptyImage);
    }
    if bitmap.width <= max_edge && bitmap.height <= max_edge {
        return Ok(bitmap.clone());
    }

    let (new_w, new_h) = if bitmap.width >= bitmap.height {
        let h = ((bitmap.height as f64 / bitmap.width as f64) * max_edge as f64).round() as u32;
        (max_edge, h.max(1))
    } else {
        let w = ((bitmap.width as f64 / bitmap.height as f64) * max_edge as f64).round() as u32;
        (w.max(1), max_edge)
    };

    let rgb = bitmap
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;
    let resized = image::imageops::resize(&rgb, new_w, new_h, image::imageops::FilterType::Triangle);
    Ok(Bitmap::from_rgb_image(resized))
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => {
            if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
                if let Some(value) = field.value.get_uint(0) {
                    return Orientation::from(value);
                }
            }
            Orientation::Normal
        }
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
