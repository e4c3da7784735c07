//! Core types for bitmap loading.

use thiserror::Error;

/// Error types for bitmap loading operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded image has no pixels.
    #[error("Decoded image is empty")]
    EmptyImage,
}

/// A natural-size bitmap with RGB pixel data.
///
/// This is the immutable working image of an edit session: it is replaced
/// wholesale when a crop is baked in, and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length is width * height * 3.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a new Bitmap with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 3) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Bitmap filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Bitmap from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Read the pixel at (x, y). Coordinates must be in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * self.width + x) * 3) as usize;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid bitmap.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_creation() {
        let pixels = vec![0u8; 64 * 32 * 3];
        let bmp = Bitmap::new(64, 32, pixels);

        assert_eq!(bmp.width, 64);
        assert_eq!(bmp.height, 32);
        assert_eq!(bmp.byte_size(), 64 * 32 * 3);
        assert!(!bmp.is_empty());
    }

    #[test]
    fn test_bitmap_filled() {
        let bmp = Bitmap::filled(4, 4, [10, 20, 30]);
        assert_eq!(bmp.pixel(0, 0), [10, 20, 30]);
        assert_eq!(bmp.pixel(3, 3), [10, 20, 30]);
    }

    #[test]
    fn test_bitmap_empty() {
        let bmp = Bitmap::new(0, 0, vec![]);
        assert!(bmp.is_empty());
    }

    #[test]
    fn test_rgb_image_round_trip() {
        let bmp = Bitmap::filled(8, 6, [1, 2, 3]);
        let img = bmp.to_rgb_image().unwrap();
        let back = Bitmap::from_rgb_image(img);
        assert_eq!(back, bmp);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::CorruptedFile("truncated scan".to_string());
        assert_eq!(
            err.to_string(),
            "Corrupted or incomplete image file: truncated scan"
        );
        assert_eq!(
            DecodeError::InvalidFormat.to_string(),
            "Invalid or unsupported image format"
        );
    }
}
