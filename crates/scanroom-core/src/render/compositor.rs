//! The transform compositor: rotation, flip and crop combined into pixels.
//!
//! Three render paths, all driven by the same [`EditState`]:
//!
//! - **Preview**: the entire working bitmap drawn into the fixed display
//!   frame, rotated and flipped about the frame center. The crop rectangle
//!   is not part of this render; it is an overlay the view positions via
//!   [`CoordinateMapper::to_screen_rect`] in unrotated natural coordinates.
//! - **Final output**: a frame sized to the rounded crop rectangle. The
//!   source crop region is drawn with its center at the frame center,
//!   rotated and flipped around that center, sampled with Lanczos3.
//! - **Crop apply**: an axis-aligned copy of the crop region only, with no
//!   rotation or flip. This is what replaces the working bitmap when a crop
//!   is baked in.
//!
//! All paths map destination pixels back to source positions (inverse
//! mapping) and sample at pixel centers. The inverse of the forward
//! rotate-after-flip composition is: undo the rotation, undo the flip, then
//! undo the scaling.

use thiserror::Error;

use crate::decode::Bitmap;
use crate::edit::EditState;
use crate::geometry::{CoordinateMapper, CropRect};

use super::sampler::{sample, InterpolationFilter};

/// Errors raised when a render target cannot be produced.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The working bitmap has no pixels to draw.
    #[error("Source bitmap is empty")]
    EmptySource,

    /// The output frame has zero area.
    #[error("Output frame has zero area: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },
}

/// Render the live preview into the mapper's fixed display frame.
///
/// The whole bitmap is scaled into the frame and rotated/flipped about the
/// frame center; content rotated past the frame edge is clipped. The frame
/// size never changes with the edit state, so overlay coordinates computed
/// against the mapper stay valid across re-renders.
pub fn render_preview(
    image: &Bitmap,
    state: &EditState,
    mapper: &CoordinateMapper,
) -> Result<Bitmap, RenderError> {
    if image.is_empty() {
        return Err(RenderError::EmptySource);
    }
    let (frame_w, frame_h) = mapper.frame_size();
    if frame_w == 0 || frame_h == 0 {
        return Err(RenderError::EmptyFrame {
            width: frame_w,
            height: frame_h,
        });
    }

    let scale = mapper.scale();
    let frame_cx = frame_w as f64 / 2.0;
    let frame_cy = frame_h as f64 / 2.0;
    let image_cx = image.width as f64 / 2.0;
    let image_cy = image.height as f64 / 2.0;

    let mut out = vec![0u8; (frame_w * frame_h * 3) as usize];
    inverse_map(
        image,
        &mut out,
        frame_w,
        frame_h,
        state,
        (frame_cx, frame_cy),
        (image_cx, image_cy),
        scale,
        InterpolationFilter::Bilinear,
    );
    Ok(Bitmap::new(frame_w, frame_h, out))
}

/// Render the final pixel-exact output.
///
/// The output frame is sized to the rounded crop rectangle. The crop region
/// is drawn with its own center at the frame center, rotated and flipped
/// around it, at natural 1:1 scale, sampled with Lanczos3. Dimensions always
/// equal the rounded crop size.
pub fn render_final(image: &Bitmap, state: &EditState) -> Result<Bitmap, RenderError> {
    if image.is_empty() {
        return Err(RenderError::EmptySource);
    }

    // Identity transform reduces to the axis-aligned crop copy
    if state.rotation_degrees == 0 && !state.flip_horizontal && !state.flip_vertical {
        return render_cropped(image, &state.crop_rect);
    }

    let (out_w, out_h) = state.crop_rect.rounded_size();
    let (crop_cx, crop_cy) = state.crop_rect.center();

    let mut out = vec![0u8; (out_w * out_h * 3) as usize];
    inverse_map(
        image,
        &mut out,
        out_w,
        out_h,
        state,
        (out_w as f64 / 2.0, out_h as f64 / 2.0),
        (crop_cx, crop_cy),
        1.0,
        InterpolationFilter::Lanczos3,
    );
    Ok(Bitmap::new(out_w, out_h, out))
}

/// Render the crop region as an axis-aligned copy, with no rotation or flip.
///
/// Used when a crop is baked into a new working bitmap. The region is
/// rounded to whole pixels and clamped to the image bounds; the result is
/// at least 1x1.
pub fn render_cropped(image: &Bitmap, crop: &CropRect) -> Result<Bitmap, RenderError> {
    if image.is_empty() {
        return Err(RenderError::EmptySource);
    }

    let x0 = (crop.x.round().max(0.0) as u32).min(image.width - 1);
    let y0 = (crop.y.round().max(0.0) as u32).min(image.height - 1);
    let (crop_w, crop_h) = crop.rounded_size();
    let out_w = crop_w.min(image.width - x0).max(1);
    let out_h = crop_h.min(image.height - y0).max(1);

    let mut out = vec![0u8; (out_w * out_h * 3) as usize];
    for y in 0..out_h {
        let src_start = (((y0 + y) * image.width + x0) * 3) as usize;
        let dst_start = (y * out_w * 3) as usize;
        let row = (out_w * 3) as usize;
        out[dst_start..dst_start + row].copy_from_slice(&image.pixels[src_start..src_start + row]);
    }
    Ok(Bitmap::new(out_w, out_h, out))
}

/// Inverse-map every destination pixel to a source position and sample it.
///
/// Forward composition is scale, then flip, then rotation, all about the
/// respective centers; here each destination pixel center is carried through
/// the inverse in reverse order.
#[allow(clippy::too_many_arguments)]
fn inverse_map(
    image: &Bitmap,
    out: &mut [u8],
    out_w: u32,
    out_h: u32,
    state: &EditState,
    out_center: (f64, f64),
    src_center: (f64, f64),
    scale: f64,
    filter: InterpolationFilter,
) {
    // Negated angle: positive degrees rotate counter-clockwise on screen
    let angle = -(state.rotation_degrees as f64).to_radians();
    let cos = angle.cos();
    let sin = angle.sin();

    for dst_y in 0..out_h {
        for dst_x in 0..out_w {
            let vx = dst_x as f64 + 0.5 - out_center.0;
            let vy = dst_y as f64 + 0.5 - out_center.1;

            // Undo rotation
            let mut rx = vx * cos - vy * sin;
            let mut ry = vx * sin + vy * cos;

            // Undo flips (self-inverse about the center)
            if state.flip_horizontal {
                rx = -rx;
            }
            if state.flip_vertical {
                ry = -ry;
            }

            let src_x = rx / scale + src_center.0 - 0.5;
            let src_y = ry / scale + src_center.1 - 0.5;

            let pixel = sample(image, src_x, src_y, filter);
            let idx = ((dst_y * out_w + dst_x) * 3) as usize;
            out[idx] = pixel[0];
            out[idx + 1] = pixel[1];
            out[idx + 2] = pixel[2];
        }
    }
}
