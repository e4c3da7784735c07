//! WASM bindings for the single-image editor session.
//!
//! `JsEditor` is the thin adapter between host pointer events and the core
//! engine: pointer positions come in as viewport coordinates, previews and
//! overlay rectangles come out. All geometry and history logic stays in the
//! core.

use scanroom_core::decode::fit_within;
use scanroom_core::{decode_bitmap, EditorSession, FlipAxis, ScreenPoint};
use wasm_bindgen::prelude::*;

use crate::types::{to_js_error, JsBitmap, JsEncodedImage};

/// Decode capture or file-selection bytes into a bitmap.
///
/// EXIF orientation is applied, so the result is always upright.
///
/// # Errors
///
/// Throws when the bytes are not a decodable image.
#[wasm_bindgen]
pub fn decode_capture(bytes: &[u8]) -> Result<JsBitmap, JsValue> {
    let bitmap = decode_bitmap(bytes).map_err(to_js_error)?;
    Ok(JsBitmap::from_bitmap(bitmap))
}

/// Downscale a bitmap so its longest edge fits within `max_edge`, preserving
/// aspect ratio. Bitmaps that already fit are returned unchanged. Use this to
/// derive a cheaper working copy from a full-resolution capture.
#[wasm_bindgen]
pub fn scale_to_fit(image: &JsBitmap, max_edge: u32) -> Result<JsBitmap, JsValue> {
    let scaled = fit_within(&image.to_bitmap(), max_edge).map_err(to_js_error)?;
    Ok(JsBitmap::from_bitmap(scaled))
}

/// A single-image edit session: crop, rotate, flip, undo/redo, save.
#[wasm_bindgen]
pub struct JsEditor {
    inner: EditorSession,
}

#[wasm_bindgen]
impl JsEditor {
    /// Open an editor on a loaded bitmap with the given viewport size.
    #[wasm_bindgen(constructor)]
    pub fn new(image: &JsBitmap, viewport_width: f64, viewport_height: f64) -> JsEditor {
        JsEditor {
            inner: EditorSession::new(image.to_bitmap(), viewport_width, viewport_height),
        }
    }

    /// Recompute the display mapping after a viewport resize.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.inner.set_viewport(width, height);
    }

    /// Set the rotation in degrees (slider range [-180, 180]).
    pub fn set_rotation(&mut self, degrees: i32) -> Result<(), JsValue> {
        self.inner.set_rotation(degrees).map_err(to_js_error)
    }

    /// Toggle the horizontal (mirror) flip.
    pub fn flip_horizontal(&mut self) -> Result<(), JsValue> {
        self.inner
            .toggle_flip(FlipAxis::Horizontal)
            .map_err(to_js_error)
    }

    /// Toggle the vertical flip.
    pub fn flip_vertical(&mut self) -> Result<(), JsValue> {
        self.inner
            .toggle_flip(FlipAxis::Vertical)
            .map_err(to_js_error)
    }

    /// Pointer-down at viewport coordinates. Returns whether a crop drag
    /// (handle resize or move) started.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.inner.drag_start(ScreenPoint::new(x, y))
    }

    /// Pointer-move at viewport coordinates. Returns whether a drag is
    /// active and the crop rectangle was updated.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.inner.drag_update(ScreenPoint::new(x, y))
    }

    /// Pointer-up: commits the drag to the history. Returns false when no
    /// drag was active.
    pub fn pointer_up(&mut self) -> bool {
        self.inner.drag_end()
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    /// Return to the original image and identity state.
    pub fn reset_all(&mut self) -> Result<(), JsValue> {
        self.inner.reset_all().map_err(to_js_error)
    }

    /// Bake the crop rectangle into a new working bitmap.
    pub fn apply_crop(&mut self) -> Result<(), JsValue> {
        self.inner.apply_crop().map_err(to_js_error)
    }

    /// Render and encode the final output.
    pub fn save(&mut self) -> Result<JsEncodedImage, JsValue> {
        let encoded = self.inner.save().map_err(to_js_error)?;
        Ok(JsEncodedImage::from_encoded(encoded))
    }

    /// Close the editor and release its bitmaps.
    pub fn cancel(&mut self) {
        self.inner.cancel();
    }

    /// Mark an async decode/encode task as pending; gestures are rejected
    /// until `finish_task`. Returns false when the session is not active.
    pub fn begin_task(&mut self) -> bool {
        self.inner.begin_task()
    }

    /// Resolve the pending task.
    pub fn finish_task(&mut self) {
        self.inner.finish_task();
    }

    /// Render the preview frame for the current edit state.
    pub fn render_preview(&self) -> Result<JsBitmap, JsValue> {
        let preview = self.inner.render_preview().map_err(to_js_error)?;
        Ok(JsBitmap::from_bitmap(preview))
    }

    /// The crop overlay rectangle in viewport coordinates, as
    /// `{x, y, width, height}`.
    pub fn overlay_rect(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.overlay_rect()).map_err(to_js_error)
    }

    /// The crop rectangle in natural image coordinates, as
    /// `{x, y, width, height}`.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.edit_state().crop_rect).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> i32 {
        self.inner.edit_state().rotation_degrees
    }

    #[wasm_bindgen(getter)]
    pub fn image_width(&self) -> u32 {
        self.inner.image().width
    }

    #[wasm_bindgen(getter)]
    pub fn image_height(&self) -> u32 {
        self.inner.image().height
    }
}
