//! The edit state of a single image: rotation, flips and crop rectangle.

use serde::{Deserialize, Serialize};

use crate::geometry::CropRect;

/// Axis of a flip toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Current rotation, flip and crop parameters for the working bitmap.
///
/// The crop rectangle is expressed in natural coordinates of the current
/// bitmap; rotation and flips are previewed but only baked into pixels when
/// the final output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditState {
    /// Rotation in degrees, slider range [-180, 180]. Not clamped here;
    /// the range is inherent to the control.
    pub rotation_degrees: i32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub crop_rect: CropRect,
}

impl EditState {
    /// The identity state for an image of the given size: no rotation, no
    /// flips, crop covering the full image.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            rotation_degrees: 0,
            flip_horizontal: false,
            flip_vertical: false,
            crop_rect: CropRect::full(width, height),
        }
    }

    /// Whether this is the identity state for an image of the given size.
    pub fn is_identity(&self, width: u32, height: u32) -> bool {
        *self == Self::identity(width, height)
    }

    pub fn set_rotation(&mut self, degrees: i32) {
        self.rotation_degrees = degrees;
    }

    pub fn toggle_flip(&mut self, axis: FlipAxis) {
        match axis {
            FlipAxis::Horizontal => self.flip_horizontal = !self.flip_horizontal,
            FlipAxis::Vertical => self.flip_vertical = !self.flip_vertical,
        }
    }

    /// Reset everything back to the identity state.
    pub fn reset_to_full_image(&mut self, width: u32, height: u32) {
        *self = Self::identity(width, height);
    }

    /// Re-base the state onto a freshly cropped bitmap: the crop rectangle
    /// becomes the new image's full bounds, rotation and flips carry over.
    pub fn rebase(&mut self, width: u32, height: u32) {
        self.crop_rect = CropRect::full(width, height);
    }
}
