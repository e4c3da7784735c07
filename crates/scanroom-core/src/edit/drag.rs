//! The pointer drag state machine for crop-rectangle editing.
//!
//! A [`DragSession`] exists only between pointer-down and pointer-up. It
//! captures the pointer position and a copy of the crop rectangle at drag
//! start; every subsequent move recomputes the rectangle from that start
//! snapshot plus the total accumulated delta, never from the previous move.
//! Duplicate or out-of-order move events therefore cannot drift the result.

use crate::geometry::{
    move_within_bounds, resize_by_handle, CoordinateMapper, CropRect, Handle, ScreenPoint,
    ScreenRect,
};

/// What a drag is doing: resizing via one handle, or moving the whole rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Resize(Handle),
    Move,
}

/// A live drag, from pointer-down to pointer-up.
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    kind: DragKind,
    pointer_start: ScreenPoint,
    rect_at_start: CropRect,
}

impl DragSession {
    /// Begin a resize drag on the given handle.
    pub fn begin_resize(handle: Handle, pointer: ScreenPoint, rect: CropRect) -> Self {
        Self {
            kind: DragKind::Resize(handle),
            pointer_start: pointer,
            rect_at_start: rect,
        }
    }

    /// Begin a whole-rectangle move drag.
    pub fn begin_move(pointer: ScreenPoint, rect: CropRect) -> Self {
        Self {
            kind: DragKind::Move,
            pointer_start: pointer,
            rect_at_start: rect,
        }
    }

    /// Route a pointer-down to a resize or move drag by hit testing the
    /// displayed crop rectangle: handles first, then the interior. Returns
    /// `None` when the pointer hits neither.
    pub fn from_pointer_down(
        pointer: ScreenPoint,
        crop: CropRect,
        mapper: &CoordinateMapper,
        handle_tolerance: f64,
    ) -> Option<Self> {
        let screen_rect: ScreenRect = mapper.to_screen_rect(&crop);
        if let Some(handle) = Handle::hit_test(&screen_rect, pointer, handle_tolerance) {
            return Some(Self::begin_resize(handle, pointer, crop));
        }
        if screen_rect.contains(pointer) {
            return Some(Self::begin_move(pointer, crop));
        }
        None
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    /// The crop rectangle for the current pointer position.
    ///
    /// Recomputed from the start snapshot and the total screen delta, so the
    /// same pointer position always yields the same rectangle.
    pub fn rect_at(
        &self,
        pointer: ScreenPoint,
        mapper: &CoordinateMapper,
        image_width: u32,
        image_height: u32,
    ) -> CropRect {
        let delta = mapper.to_natural_delta(
            pointer.x - self.pointer_start.x,
            pointer.y - self.pointer_start.y,
        );
        match self.kind {
            DragKind::Resize(handle) => {
                resize_by_handle(&self.rect_at_start, handle, delta, image_width, image_height)
            }
            DragKind::Move => {
                move_within_bounds(&self.rect_at_start, delta, image_width, image_height)
            }
        }
    }
}
