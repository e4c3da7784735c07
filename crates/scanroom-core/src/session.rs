//! The per-image edit session.
//!
//! [`EditorSession`] is the one reusable engine behind both the single-image
//! editor and the multi-page capture flow. It exclusively owns the working
//! bitmap, the [`EditState`], the [`HistoryStack`] and the
//! [`CoordinateMapper`], and has an explicit lifecycle:
//!
//! ```text
//! open -> edit* -> save | cancel -> closed
//! ```
//!
//! Everything runs on one cooperative interaction thread; a pointer move is
//! fully processed before the next event is handled, so no locking is
//! needed. The operations that genuinely suspend (bitmap decode, output
//! encode) run outside the session; while the host marks one pending via
//! [`EditorSession::begin_task`], gestures and edits are rejected rather
//! than applied against a bitmap that is mid-replacement.

use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use crate::decode::Bitmap;
use crate::edit::{DragSession, EditState, FlipAxis, HistorySnapshot, HistoryStack};
use crate::encode::{encode_output, EncodeError, EncodedImage};
use crate::geometry::{CoordinateMapper, ScreenPoint, ScreenRect};
use crate::render::{render_cropped, render_final, render_preview, RenderError};

/// Hit-test tolerance around a crop handle, in screen pixels.
pub const HANDLE_HIT_RADIUS: f64 = 16.0;

/// Lifecycle phase of an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepting edits and gestures.
    Active,
    /// A decode/encode task is pending; gestures are rejected.
    Busy,
    /// Saved or cancelled; all operations are rejected.
    Closed,
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A decode/encode task is pending; retry when it resolves.
    #[error("Editor session is busy with a pending task")]
    SessionBusy,

    /// The session was saved or cancelled.
    #[error("Editor session is closed")]
    SessionClosed,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A single-image edit session: crop, rotate, flip, undo/redo, save.
#[derive(Debug)]
pub struct EditorSession {
    /// Current working bitmap; replaced wholesale by crop apply.
    image: Arc<Bitmap>,
    /// The bitmap as loaded, kept for reset-all.
    original: Arc<Bitmap>,
    state: EditState,
    history: HistoryStack,
    mapper: CoordinateMapper,
    viewport: (f64, f64),
    drag: Option<DragSession>,
    phase: SessionPhase,
}

impl EditorSession {
    /// Open a session on a freshly loaded bitmap.
    ///
    /// The history starts with one snapshot of the identity state carrying
    /// the loaded bitmap.
    pub fn new(bitmap: Bitmap, viewport_width: f64, viewport_height: f64) -> Self {
        let image = Arc::new(bitmap);
        let state = EditState::identity(image.width, image.height);
        let history = HistoryStack::new(HistorySnapshot::with_bitmap(state, Arc::clone(&image)));
        let mapper =
            CoordinateMapper::fit(image.width, image.height, viewport_width, viewport_height);
        debug!(
            "editor session opened: {}x{} image, {:.0}x{:.0} viewport",
            image.width, image.height, viewport_width, viewport_height
        );
        Self {
            original: Arc::clone(&image),
            image,
            state,
            history,
            mapper,
            viewport: (viewport_width, viewport_height),
            drag: None,
            phase: SessionPhase::Active,
        }
    }

    /// Resume editing an already-shared bitmap with a previously committed
    /// edit state. Used when a multi-page session re-activates a page; the
    /// page's history starts fresh from the committed state.
    pub fn resume(
        image: Arc<Bitmap>,
        state: EditState,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Self {
        let history = HistoryStack::new(HistorySnapshot::with_bitmap(state, Arc::clone(&image)));
        let mapper =
            CoordinateMapper::fit(image.width, image.height, viewport_width, viewport_height);
        Self {
            original: Arc::clone(&image),
            image,
            state,
            history,
            mapper,
            viewport: (viewport_width, viewport_height),
            drag: None,
            phase: SessionPhase::Active,
        }
    }

    pub fn image(&self) -> &Bitmap {
        &self.image
    }

    pub(crate) fn image_arc(&self) -> Arc<Bitmap> {
        Arc::clone(&self.image)
    }

    pub fn edit_state(&self) -> &EditState {
        &self.state
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The crop rectangle in screen coordinates, for overlay placement.
    pub fn overlay_rect(&self) -> ScreenRect {
        self.mapper.to_screen_rect(&self.state.crop_rect)
    }

    /// Abandon an in-flight drag, rolling the crop rectangle back to the
    /// last committed snapshot. No-op when no drag is active.
    pub fn abandon_drag(&mut self) {
        if self.drag.take().is_some() {
            debug!("drag abandoned; crop rolled back to last snapshot");
            self.state.crop_rect = self.history.current().state.crop_rect;
        }
    }

    /// Recompute the display mapping for a new viewport size.
    ///
    /// The mapper is read-only during a drag, so an in-flight drag is
    /// abandoned (its uncommitted rectangle is discarded).
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if self.drag.is_some() {
            debug!("viewport changed mid-drag");
            self.abandon_drag();
        }
        self.viewport = (width, height);
        self.mapper = CoordinateMapper::fit(self.image.width, self.image.height, width, height);
    }

    /// Mark a decode/encode task as pending. Gestures and edits are
    /// rejected until [`EditorSession::finish_task`]. Returns false when the
    /// session is not active.
    pub fn begin_task(&mut self) -> bool {
        if self.phase != SessionPhase::Active {
            return false;
        }
        self.phase = SessionPhase::Busy;
        true
    }

    /// Resolve the pending task. A session closed while the task was in
    /// flight stays closed and the caller discards the task's result.
    pub fn finish_task(&mut self) {
        if self.phase == SessionPhase::Busy {
            self.phase = SessionPhase::Active;
        }
    }

    fn ensure_active(&self) -> Result<(), EditorError> {
        match self.phase {
            SessionPhase::Active => Ok(()),
            SessionPhase::Busy => Err(EditorError::SessionBusy),
            SessionPhase::Closed => Err(EditorError::SessionClosed),
        }
    }

    /// Set the rotation (slider range [-180, 180]) and snapshot it.
    pub fn set_rotation(&mut self, degrees: i32) -> Result<(), EditorError> {
        self.ensure_active()?;
        self.state.set_rotation(degrees);
        self.history.push(HistorySnapshot::of_state(self.state));
        Ok(())
    }

    /// Toggle a flip axis and snapshot it.
    pub fn toggle_flip(&mut self, axis: FlipAxis) -> Result<(), EditorError> {
        self.ensure_active()?;
        self.state.toggle_flip(axis);
        self.history.push(HistorySnapshot::of_state(self.state));
        Ok(())
    }

    /// Pointer-down: begin a resize or move drag if the pointer hits a
    /// handle or the crop interior. Returns whether a drag started.
    pub fn drag_start(&mut self, pointer: ScreenPoint) -> bool {
        if self.phase != SessionPhase::Active {
            warn!("pointer-down rejected: session {:?}", self.phase);
            return false;
        }
        if self.drag.is_some() {
            // A second pointer-down without pointer-up restarts the drag
            debug!("pointer-down during drag; restarting drag session");
        }
        self.drag = DragSession::from_pointer_down(
            pointer,
            self.state.crop_rect,
            &self.mapper,
            HANDLE_HIT_RADIUS,
        );
        self.drag.is_some()
    }

    /// Pointer-move: recompute the crop rectangle from the drag-start
    /// snapshot. Returns false when no drag is active.
    pub fn drag_update(&mut self, pointer: ScreenPoint) -> bool {
        if self.phase != SessionPhase::Active {
            return false;
        }
        match self.drag {
            Some(drag) => {
                self.state.crop_rect =
                    drag.rect_at(pointer, &self.mapper, self.image.width, self.image.height);
                true
            }
            None => false,
        }
    }

    /// Pointer-up: close the drag and snapshot the resulting rectangle.
    /// A pointer-up without a prior pointer-down is a no-op.
    pub fn drag_end(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.history.push(HistorySnapshot::of_state(self.state));
        true
    }

    /// Step back one snapshot, restoring its edit state and, when the
    /// snapshot chain carries one, its bitmap. Returns false at the oldest
    /// entry or when the session is not active.
    pub fn undo(&mut self) -> bool {
        if self.phase != SessionPhase::Active || self.history.undo().is_none() {
            return false;
        }
        self.restore_current();
        true
    }

    /// Step forward one snapshot. Counterpart of [`EditorSession::undo`].
    pub fn redo(&mut self) -> bool {
        if self.phase != SessionPhase::Active || self.history.redo().is_none() {
            return false;
        }
        self.restore_current();
        true
    }

    /// Return to the original image and identity state. Entry 0 of the
    /// history is overwritten; redo after a reset is disabled by design.
    pub fn reset_all(&mut self) -> Result<(), EditorError> {
        self.ensure_active()?;
        let identity = EditState::identity(self.original.width, self.original.height);
        self.history.reset_all(HistorySnapshot::with_bitmap(
            identity,
            Arc::clone(&self.original),
        ));
        self.restore_current();
        Ok(())
    }

    /// Bake the crop rectangle into a new working bitmap.
    ///
    /// Renders the crop region (no rotation or flip), replaces the working
    /// bitmap, re-bases the edit state onto it, and pushes a snapshot
    /// carrying the new bitmap so undo can restore the old one verbatim.
    pub fn apply_crop(&mut self) -> Result<(), EditorError> {
        self.ensure_active()?;
        let cropped = render_cropped(&self.image, &self.state.crop_rect)?;
        self.replace_image(Arc::new(cropped));
        self.history
            .push(HistorySnapshot::with_bitmap(self.state, self.image_arc()));
        debug!(
            "crop applied: working bitmap is now {}x{}",
            self.image.width, self.image.height
        );
        Ok(())
    }

    /// Render the final pixel-exact output and encode it.
    ///
    /// The session stays open; the caller decides whether to close it.
    pub fn save(&mut self) -> Result<EncodedImage, EditorError> {
        self.ensure_active()?;
        let rendered = render_final(&self.image, &self.state)?;
        let encoded = encode_output(&rendered)?;
        debug!(
            "saved {}x{} output as {:?}",
            encoded.width, encoded.height, encoded.format
        );
        Ok(encoded)
    }

    /// Render the live preview for the current edit state.
    pub fn render_preview(&self) -> Result<Bitmap, EditorError> {
        if self.phase == SessionPhase::Closed {
            return Err(EditorError::SessionClosed);
        }
        Ok(render_preview(&self.image, &self.state, &self.mapper)?)
    }

    /// Close the session and release retained bitmaps. Any still-pending
    /// task result is discarded by the host against a closed session.
    pub fn cancel(&mut self) {
        self.drag = None;
        self.history.release();
        self.phase = SessionPhase::Closed;
        debug!("editor session closed");
    }

    /// Restore image and state from the history's current snapshot.
    fn restore_current(&mut self) {
        self.state = self.history.current().state;
        if let Some(bitmap) = self.history.current_bitmap() {
            if !Arc::ptr_eq(bitmap, &self.image) {
                let bitmap = Arc::clone(bitmap);
                self.replace_image(bitmap);
                // The snapshot's state already matches the restored bitmap
                self.state = self.history.current().state;
            }
        }
    }

    /// Swap in a new working bitmap and refit the display mapping.
    fn replace_image(&mut self, bitmap: Arc<Bitmap>) {
        self.image = bitmap;
        self.state.rebase(self.image.width, self.image.height);
        self.mapper = CoordinateMapper::fit(
            self.image.width,
            self.image.height,
            self.viewport.0,
            self.viewport.1,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CropRect, Handle};

    fn unique_pixels(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    fn session() -> EditorSession {
        EditorSession::new(unique_pixels(1000, 800), 1000.0, 800.0)
    }

    #[test]
    fn test_open_session_is_identity() {
        let s = session();
        assert_eq!(s.phase(), SessionPhase::Active);
        assert!(s.edit_state().is_identity(1000, 800));
        assert!(!s.can_undo());
        assert!(!s.can_redo());
    }

    #[test]
    fn test_full_crop_apply_then_save_keeps_dimensions() {
        let mut s = session();
        s.apply_crop().unwrap();
        let out = s.save().unwrap();
        assert_eq!((out.width, out.height), (1000, 800));
    }

    #[test]
    fn test_rotation_and_flip_push_history() {
        let mut s = session();
        s.set_rotation(30).unwrap();
        s.toggle_flip(FlipAxis::Horizontal).unwrap();

        assert_eq!(s.edit_state().rotation_degrees, 30);
        assert!(s.edit_state().flip_horizontal);
        assert!(s.can_undo());

        s.undo();
        assert!(!s.edit_state().flip_horizontal);
        s.undo();
        assert_eq!(s.edit_state().rotation_degrees, 0);
    }

    #[test]
    fn test_drag_pipeline_moves_crop() {
        let mut s = session();
        // Grab the nw corner of the displayed crop rect
        let corner = Handle::NorthWest.screen_position(&s.overlay_rect());
        assert!(s.drag_start(corner));

        // Drag by a screen delta equal to (100, 50) natural pixels
        let scale = s.mapper().scale();
        let target = ScreenPoint::new(corner.x + 100.0 * scale, corner.y + 50.0 * scale);
        assert!(s.drag_update(target));
        assert!(s.drag_end());

        let crop = s.edit_state().crop_rect;
        assert!((crop.x - 100.0).abs() < 1e-6);
        assert!((crop.y - 50.0).abs() < 1e-6);
        assert!((crop.width - 900.0).abs() < 1e-6);
        assert!((crop.height - 750.0).abs() < 1e-6);
        assert!(s.can_undo());
    }

    #[test]
    fn test_drag_end_without_start_is_noop() {
        let mut s = session();
        assert!(!s.drag_end());
        assert!(!s.can_undo());
    }

    #[test]
    fn test_drag_update_without_start_is_noop() {
        let mut s = session();
        assert!(!s.drag_update(ScreenPoint::new(10.0, 10.0)));
        assert!(s.edit_state().is_identity(1000, 800));
    }

    #[test]
    fn test_undo_restores_bitmap_after_crop_apply() {
        let mut s = session();
        let original = s.image().clone();

        s.set_rotation(15).unwrap();
        s.drag_start(Handle::NorthWest.screen_position(&s.overlay_rect()));
        let scale = s.mapper().scale();
        let corner = Handle::NorthWest.screen_position(&s.overlay_rect());
        s.drag_update(ScreenPoint::new(
            corner.x + 200.0 * scale,
            corner.y + 100.0 * scale,
        ));
        s.drag_end();
        s.apply_crop().unwrap();
        assert_eq!(s.image().width, 800);
        assert_eq!(s.image().height, 700);
        // Rotation carries across the bake
        assert_eq!(s.edit_state().rotation_degrees, 15);

        assert!(s.undo());
        // Bit-for-bit restoration of the pre-crop bitmap
        assert_eq!(*s.image(), original);
        let crop = s.edit_state().crop_rect;
        assert!((crop.x - 200.0).abs() < 1e-6);

        assert!(s.redo());
        assert_eq!(s.image().width, 800);
    }

    #[test]
    fn test_undo_twice_then_redo_walks_history() {
        // S0 initial; push S1, S2, S3; undo x2 -> S1; redo -> S2
        let mut s = session();
        s.set_rotation(10).unwrap(); // S1
        s.set_rotation(20).unwrap(); // S2
        s.set_rotation(30).unwrap(); // S3

        s.undo();
        s.undo();
        assert_eq!(s.edit_state().rotation_degrees, 10);
        s.redo();
        assert_eq!(s.edit_state().rotation_degrees, 20);
    }

    #[test]
    fn test_reset_all_restores_original_image_and_state() {
        let mut s = session();
        let original = s.image().clone();

        s.set_rotation(45).unwrap();
        s.apply_crop().unwrap();
        assert_ne!(*s.image(), original);

        s.reset_all().unwrap();
        assert_eq!(*s.image(), original);
        assert!(s.edit_state().is_identity(1000, 800));
        assert!(!s.can_undo());
        // Redo after reset-all is disabled by design
        assert!(!s.can_redo());
        assert!(!s.redo());
    }

    #[test]
    fn test_busy_gate_rejects_gestures_and_edits() {
        let mut s = session();
        assert!(s.begin_task());

        assert!(!s.drag_start(ScreenPoint::new(500.0, 400.0)));
        assert!(!s.undo());
        assert!(matches!(s.set_rotation(10), Err(EditorError::SessionBusy)));
        assert!(matches!(s.apply_crop(), Err(EditorError::SessionBusy)));

        s.finish_task();
        assert!(s.set_rotation(10).is_ok());
    }

    #[test]
    fn test_begin_task_is_not_reentrant() {
        let mut s = session();
        assert!(s.begin_task());
        assert!(!s.begin_task());
    }

    #[test]
    fn test_cancel_closes_session() {
        let mut s = session();
        s.set_rotation(20).unwrap();
        s.cancel();

        assert_eq!(s.phase(), SessionPhase::Closed);
        assert!(matches!(s.set_rotation(5), Err(EditorError::SessionClosed)));
        assert!(matches!(s.save(), Err(EditorError::SessionClosed)));
        assert!(!s.drag_start(ScreenPoint::new(500.0, 400.0)));
    }

    #[test]
    fn test_cancel_while_task_pending_stays_closed() {
        let mut s = session();
        assert!(s.begin_task());
        s.cancel();
        // The late task resolution must not reopen the session
        s.finish_task();
        assert_eq!(s.phase(), SessionPhase::Closed);
    }

    #[test]
    fn test_save_reflects_crop_and_rotation() {
        let mut s = session();
        s.drag_start(Handle::SouthEast.screen_position(&s.overlay_rect()));
        let corner = Handle::SouthEast.screen_position(&s.overlay_rect());
        let scale = s.mapper().scale();
        s.drag_update(ScreenPoint::new(
            corner.x - 500.0 * scale,
            corner.y - 400.0 * scale,
        ));
        s.drag_end();

        let out = s.save().unwrap();
        assert_eq!((out.width, out.height), (500, 400));
    }

    #[test]
    fn test_set_viewport_abandons_drag() {
        let mut s = session();
        let corner = Handle::NorthWest.screen_position(&s.overlay_rect());
        s.drag_start(corner);
        let scale = s.mapper().scale();
        s.drag_update(ScreenPoint::new(corner.x + 300.0 * scale, corner.y));

        s.set_viewport(400.0, 300.0);
        // Uncommitted drag rectangle rolled back to the last snapshot
        assert!(s.edit_state().is_identity(1000, 800));
        assert!(!s.drag_end());
    }

    #[test]
    fn test_preview_render_uses_frame_size() {
        let s = session();
        let preview = s.render_preview().unwrap();
        assert_eq!((preview.width, preview.height), s.mapper().frame_size());
    }
}
