//! Mapping between natural image coordinates and displayed screen coordinates.
//!
//! The mapper is a pure function of the natural image size and the viewport:
//! it holds a single uniform scale factor and the screen offset of the
//! natural origin. It is recomputed when the image or the viewport changes
//! and is read-only for the duration of a drag.
//!
//! The display frame it produces is deliberately **fixed**: previewing a
//! rotation or flip changes the pixels composited inside the frame but not
//! the frame itself, so crop-overlay coordinates stay valid across preview
//! re-renders.

use serde::{Deserialize, Serialize};

use super::CropRect;

/// Fraction of the limiting viewport dimension the fitted image fills.
pub const VIEWPORT_FILL: f64 = 0.95;

/// A point in screen (displayed) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Converts between natural pixel coordinates and displayed coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    /// displayed width / natural width.
    scale: f64,
    /// Screen position of the natural origin (top-left of the display frame).
    offset: ScreenPoint,
    /// Display frame size in screen pixels (rounded).
    frame_width: u32,
    frame_height: u32,
}

impl CoordinateMapper {
    /// Fit a natural image into the available viewport, preserving aspect
    /// ratio and filling [`VIEWPORT_FILL`] of the limiting dimension. The
    /// frame is centered in the viewport.
    pub fn fit(natural_width: u32, natural_height: u32, viewport_width: f64, viewport_height: f64) -> Self {
        let nw = natural_width.max(1) as f64;
        let nh = natural_height.max(1) as f64;
        let vw = viewport_width.max(1.0);
        let vh = viewport_height.max(1.0);

        let scale = VIEWPORT_FILL * (vw / nw).min(vh / nh);
        let frame_w = nw * scale;
        let frame_h = nh * scale;
        let offset = ScreenPoint::new((vw - frame_w) / 2.0, (vh - frame_h) / 2.0);

        Self {
            scale,
            offset,
            frame_width: (frame_w.round() as u32).max(1),
            frame_height: (frame_h.round() as u32).max(1),
        }
    }

    /// The uniform display scale (displayed width / natural width).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen position of the natural origin.
    pub fn offset(&self) -> ScreenPoint {
        self.offset
    }

    /// Size of the fixed display frame in screen pixels.
    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Convert a screen-space delta to a natural-space delta.
    pub fn to_natural_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.scale, dy / self.scale)
    }

    /// Convert a screen point to natural coordinates.
    pub fn to_natural_point(&self, p: ScreenPoint) -> (f64, f64) {
        ((p.x - self.offset.x) / self.scale, (p.y - self.offset.y) / self.scale)
    }

    /// Convert a natural-space rectangle to screen coordinates.
    pub fn to_screen_rect(&self, rect: &CropRect) -> ScreenRect {
        ScreenRect::new(
            rect.x * self.scale + self.offset.x,
            rect.y * self.scale + self.offset.y,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_landscape_into_square_viewport() {
        let mapper = CoordinateMapper::fit(1000, 500, 800.0, 800.0);

        // Width limits: scale = 0.95 * 800/1000
        assert!((mapper.scale() - 0.76).abs() < 1e-9);

        let (fw, fh) = mapper.frame_size();
        assert_eq!(fw, 760);
        assert_eq!(fh, 380);

        // Centered both ways
        assert!((mapper.offset().x - 20.0).abs() < 1e-9);
        assert!((mapper.offset().y - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_portrait_limited_by_height() {
        let mapper = CoordinateMapper::fit(500, 1000, 800.0, 400.0);
        assert!((mapper.scale() - 0.95 * 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_delta_round_trip() {
        let mapper = CoordinateMapper::fit(1000, 800, 500.0, 500.0);
        let (dx, dy) = mapper.to_natural_delta(10.0, -4.0);
        assert!((dx * mapper.scale() - 10.0).abs() < 1e-9);
        assert!((dy * mapper.scale() + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_screen_rect_applies_scale_and_offset() {
        let mapper = CoordinateMapper::fit(1000, 500, 800.0, 800.0);
        let rect = CropRect::new(0.0, 0.0, 1000.0, 500.0);
        let screen = mapper.to_screen_rect(&rect);

        assert!((screen.x - mapper.offset().x).abs() < 1e-9);
        assert!((screen.y - mapper.offset().y).abs() < 1e-9);
        assert!((screen.width - 1000.0 * mapper.scale()).abs() < 1e-9);
        assert!((screen.height - 500.0 * mapper.scale()).abs() < 1e-9);
    }

    #[test]
    fn test_to_natural_point_inverts_to_screen() {
        let mapper = CoordinateMapper::fit(640, 480, 320.0, 320.0);
        let p = ScreenPoint::new(100.0, 150.0);
        let (nx, ny) = mapper.to_natural_point(p);
        assert!((nx * mapper.scale() + mapper.offset().x - p.x).abs() < 1e-9);
        assert!((ny * mapper.scale() + mapper.offset().y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs_do_not_panic() {
        let mapper = CoordinateMapper::fit(0, 0, 0.0, 0.0);
        assert!(mapper.scale() > 0.0);
        let (fw, fh) = mapper.frame_size();
        assert!(fw >= 1 && fh >= 1);
    }

    #[test]
    fn test_screen_rect_contains() {
        let r = ScreenRect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(ScreenPoint::new(10.0, 10.0)));
        assert!(r.contains(ScreenPoint::new(30.0, 30.0)));
        assert!(!r.contains(ScreenPoint::new(31.0, 30.0)));
        assert!(!r.contains(ScreenPoint::new(9.9, 15.0)));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
