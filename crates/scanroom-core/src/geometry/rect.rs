//! Crop rectangle geometry: handle-driven resizing and bounded movement.
//!
//! All rectangles here live in natural coordinates of the current working
//! bitmap. Geometry never fails: any pointer delta, however large, is
//! clamped so the resulting rectangle stays inside the image and above the
//! minimum size.

use serde::{Deserialize, Serialize};

use super::mapper::{ScreenPoint, ScreenRect};

/// Minimum crop rectangle edge length in natural pixels.
///
/// Images smaller than this on an axis use their full extent as the minimum
/// instead, so they stay croppable at full bounds.
pub const MIN_CROP_SIZE: f64 = 50.0;

/// The crop sub-region, in natural coordinates of the current bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full bounds of an image of the given size.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Output pixel dimensions: the rounded crop size, at least 1x1.
    pub fn rounded_size(&self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }

    /// Whether the rectangle satisfies the crop invariant for an image of
    /// the given natural size.
    pub fn is_valid_for(&self, image_width: u32, image_height: u32) -> bool {
        let min_w = MIN_CROP_SIZE.min(image_width as f64);
        let min_h = MIN_CROP_SIZE.min(image_height as f64);
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= min_w
            && self.height >= min_h
            && self.right() <= image_width as f64 + 1e-6
            && self.bottom() <= image_height as f64 + 1e-6
    }
}

/// One of the eight resize affordances on the crop rectangle.
///
/// Corner handles own two edges, edge handles own one. Moving a handle moves
/// only the edges it owns; the opposite edge stays fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NorthWest,
        Handle::North,
        Handle::NorthEast,
        Handle::East,
        Handle::SouthEast,
        Handle::South,
        Handle::SouthWest,
        Handle::West,
    ];

    /// Whether this handle moves the west (left) edge.
    fn owns_west(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::West | Handle::SouthWest)
    }

    /// Whether this handle moves the east (right) edge.
    fn owns_east(self) -> bool {
        matches!(self, Handle::NorthEast | Handle::East | Handle::SouthEast)
    }

    /// Whether this handle moves the north (top) edge.
    fn owns_north(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::North | Handle::NorthEast)
    }

    /// Whether this handle moves the south (bottom) edge.
    fn owns_south(self) -> bool {
        matches!(self, Handle::SouthWest | Handle::South | Handle::SouthEast)
    }

    /// Screen position of the handle on a displayed crop rectangle: corners
    /// at the corners, edge handles at edge midpoints.
    pub fn screen_position(self, rect: &ScreenRect) -> ScreenPoint {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Handle::NorthWest => ScreenPoint::new(rect.x, rect.y),
            Handle::North => ScreenPoint::new(cx, rect.y),
            Handle::NorthEast => ScreenPoint::new(rect.x + rect.width, rect.y),
            Handle::East => ScreenPoint::new(rect.x + rect.width, cy),
            Handle::SouthEast => ScreenPoint::new(rect.x + rect.width, rect.y + rect.height),
            Handle::South => ScreenPoint::new(cx, rect.y + rect.height),
            Handle::SouthWest => ScreenPoint::new(rect.x, rect.y + rect.height),
            Handle::West => ScreenPoint::new(rect.x, cy),
        }
    }

    /// Find the handle under a screen point, if any is within `tolerance`
    /// (Chebyshev distance, matching a square hit target).
    pub fn hit_test(rect: &ScreenRect, p: ScreenPoint, tolerance: f64) -> Option<Handle> {
        Handle::ALL.into_iter().find(|h| {
            let pos = h.screen_position(rect);
            (p.x - pos.x).abs() <= tolerance && (p.y - pos.y).abs() <= tolerance
        })
    }
}

/// Resize `start` by dragging `handle` with the given natural-space delta.
///
/// Each owned edge is clamped independently: it cannot cross the image
/// bounds, and the size on its axis cannot drop below the minimum. The
/// opposite edge never moves.
pub fn resize_by_handle(
    start: &CropRect,
    handle: Handle,
    delta: (f64, f64),
    image_width: u32,
    image_height: u32,
) -> CropRect {
    let bounds_w = image_width as f64;
    let bounds_h = image_height as f64;
    let min_w = MIN_CROP_SIZE.min(bounds_w);
    let min_h = MIN_CROP_SIZE.min(bounds_h);

    let mut rect = *start;

    if handle.owns_west() {
        let new_x = (start.x + delta.0).clamp(0.0, start.right() - min_w);
        rect.width = start.right() - new_x;
        rect.x = new_x;
    } else if handle.owns_east() {
        let new_right = (start.right() + delta.0).clamp(start.x + min_w, bounds_w);
        rect.width = new_right - start.x;
    }

    if handle.owns_north() {
        let new_y = (start.y + delta.1).clamp(0.0, start.bottom() - min_h);
        rect.height = start.bottom() - new_y;
        rect.y = new_y;
    } else if handle.owns_south() {
        let new_bottom = (start.bottom() + delta.1).clamp(start.y + min_h, bounds_h);
        rect.height = new_bottom - start.y;
    }

    rect
}

/// Translate `start` by the given natural-space delta at constant size,
/// clamped so the whole rectangle stays inside the image.
pub fn move_within_bounds(
    start: &CropRect,
    delta: (f64, f64),
    image_width: u32,
    image_height: u32,
) -> CropRect {
    let max_x = (image_width as f64 - start.width).max(0.0);
    let max_y = (image_height as f64 - start.height).max(0.0);
    CropRect {
        x: (start.x + delta.0).clamp(0.0, max_x),
        y: (start.y + delta.1).clamp(0.0, max_y),
        width: start.width,
        height: start.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_rect() {
        let r = CropRect::full(1000, 800);
        assert_eq!(r, CropRect::new(0.0, 0.0, 1000.0, 800.0));
        assert!(r.is_valid_for(1000, 800));
    }

    #[test]
    fn test_nw_drag_scenario() {
        // 1000x800 image, full crop, drag nw by (+100, +50)
        let start = CropRect::full(1000, 800);
        let result = resize_by_handle(&start, Handle::NorthWest, (100.0, 50.0), 1000, 800);
        assert_eq!(result, CropRect::new(100.0, 50.0, 900.0, 750.0));
    }

    #[test]
    fn test_se_drag_shrinks_from_bottom_right() {
        let start = CropRect::full(1000, 800);
        let result = resize_by_handle(&start, Handle::SouthEast, (-200.0, -100.0), 1000, 800);
        assert_eq!(result, CropRect::new(0.0, 0.0, 800.0, 700.0));
    }

    #[test]
    fn test_edge_handle_moves_one_axis_only() {
        let start = CropRect::new(100.0, 100.0, 400.0, 300.0);
        let result = resize_by_handle(&start, Handle::East, (50.0, 999.0), 1000, 800);
        assert_eq!(result, CropRect::new(100.0, 100.0, 450.0, 300.0));

        let result = resize_by_handle(&start, Handle::North, (999.0, -50.0), 1000, 800);
        assert_eq!(result, CropRect::new(100.0, 50.0, 400.0, 350.0));
    }

    #[test]
    fn test_resize_clamps_at_image_bounds() {
        let start = CropRect::new(100.0, 100.0, 400.0, 300.0);
        let result = resize_by_handle(&start, Handle::NorthWest, (-1e6, -1e6), 1000, 800);
        assert_eq!(result.x, 0.0);
        assert_eq!(result.y, 0.0);
        assert_eq!(result.right(), 500.0);
        assert_eq!(result.bottom(), 400.0);
    }

    #[test]
    fn test_resize_clamps_at_min_size() {
        let start = CropRect::new(100.0, 100.0, 400.0, 300.0);
        let result = resize_by_handle(&start, Handle::West, (1e6, 0.0), 1000, 800);
        assert_eq!(result.width, MIN_CROP_SIZE);
        // Opposite (east) edge held fixed
        assert_eq!(result.right(), 500.0);
    }

    #[test]
    fn test_resize_opposite_corner_fixed() {
        let start = CropRect::new(200.0, 150.0, 300.0, 200.0);
        let result = resize_by_handle(&start, Handle::NorthWest, (40.0, 30.0), 1000, 800);
        assert_eq!(result.right(), start.right());
        assert_eq!(result.bottom(), start.bottom());
    }

    #[test]
    fn test_min_size_on_small_image() {
        // Image smaller than MIN_CROP_SIZE: full extent becomes the minimum
        let start = CropRect::full(40, 30);
        let result = resize_by_handle(&start, Handle::East, (-1e6, 0.0), 40, 30);
        assert_eq!(result.width, 40.0);
    }

    #[test]
    fn test_move_translates_both_axes() {
        let start = CropRect::new(100.0, 100.0, 200.0, 150.0);
        let result = move_within_bounds(&start, (50.0, -30.0), 1000, 800);
        assert_eq!(result, CropRect::new(150.0, 70.0, 200.0, 150.0));
    }

    #[test]
    fn test_move_clamps_and_preserves_size() {
        let start = CropRect::new(100.0, 100.0, 200.0, 150.0);
        let result = move_within_bounds(&start, (1e6, -1e6), 1000, 800);
        assert_eq!(result, CropRect::new(800.0, 0.0, 200.0, 150.0));
    }

    #[test]
    fn test_move_full_rect_is_pinned() {
        let start = CropRect::full(1000, 800);
        let result = move_within_bounds(&start, (123.0, -77.0), 1000, 800);
        assert_eq!(result, start);
    }

    #[test]
    fn test_handle_screen_positions() {
        let rect = ScreenRect::new(10.0, 20.0, 100.0, 60.0);
        assert_eq!(
            Handle::NorthWest.screen_position(&rect),
            ScreenPoint::new(10.0, 20.0)
        );
        assert_eq!(
            Handle::South.screen_position(&rect),
            ScreenPoint::new(60.0, 80.0)
        );
        assert_eq!(
            Handle::East.screen_position(&rect),
            ScreenPoint::new(110.0, 50.0)
        );
    }

    #[test]
    fn test_hit_test_finds_nearest_handle() {
        let rect = ScreenRect::new(0.0, 0.0, 100.0, 100.0);
        let hit = Handle::hit_test(&rect, ScreenPoint::new(2.0, -3.0), 8.0);
        assert_eq!(hit, Some(Handle::NorthWest));

        let hit = Handle::hit_test(&rect, ScreenPoint::new(50.0, 101.0), 8.0);
        assert_eq!(hit, Some(Handle::South));

        let hit = Handle::hit_test(&rect, ScreenPoint::new(50.0, 50.0), 8.0);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_rounded_size() {
        let r = CropRect::new(0.0, 0.0, 899.6, 750.4);
        assert_eq!(r.rounded_size(), (900, 750));

        let tiny = CropRect::new(0.0, 0.0, 0.2, 0.2);
        assert_eq!(tiny.rounded_size(), (1, 1));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
