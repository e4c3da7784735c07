//! Pure page-layout math for document composition.
//!
//! Each captured image is fitted into a printable page: scaled down to the
//! area inside the margins when it is too large (never scaled up), and
//! centered on the page. All math here is headless and exact; the composer
//! implementation only executes the placements this module computes.

use super::ComposeOptions;

/// Where an image lands on a page, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Convert millimeters to pixels at the given resolution.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm / 25.4 * dpi as f64).round() as u32
}

/// Full page size in pixels for the given options.
pub fn page_pixel_size(options: &ComposeOptions) -> (u32, u32) {
    let (w_mm, h_mm) = options.oriented_page_mm();
    (
        mm_to_px(w_mm, options.dpi).max(1),
        mm_to_px(h_mm, options.dpi).max(1),
    )
}

/// Printable content size in pixels: the page minus the margin on all sides.
pub fn content_pixel_size(options: &ComposeOptions) -> (u32, u32) {
    let (page_w, page_h) = page_pixel_size(options);
    let margin = mm_to_px(options.margin_mm, options.dpi);
    (
        page_w.saturating_sub(2 * margin).max(1),
        page_h.saturating_sub(2 * margin).max(1),
    )
}

/// Compute where an image of the given natural size lands on the page.
///
/// The image is scaled by `min(content_w / w, content_h / h, 1.0)`, so it
/// is only ever scaled down, and centered on the full page.
pub fn fit_on_page(image_width: u32, image_height: u32, options: &ComposeOptions) -> Placement {
    let (page_w, page_h) = page_pixel_size(options);
    let (content_w, content_h) = content_pixel_size(options);

    let scale = (content_w as f64 / image_width.max(1) as f64)
        .min(content_h as f64 / image_height.max(1) as f64)
        .min(1.0);

    let width = ((image_width as f64 * scale).round() as u32).max(1);
    let height = ((image_height as f64 * scale).round() as u32).max(1);

    Placement {
        x: (page_w.saturating_sub(width)) / 2,
        y: (page_h.saturating_sub(height)) / 2,
        width,
        height,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
