//! Page composition: turning an ordered set of finished page images into a
//! single multi-page document.
//!
//! The engine treats composition as an external collaborator behind the
//! [`DocumentComposer`] trait: one call, ordered images in, document bytes
//! out. Each image is fitted onto its own page (scaled down only, never up,
//! and centered) using the pure layout math in this module. The bundled
//! [`TiffComposer`] writes one TIFF directory per page; hosts can substitute
//! any other paginated container behind the same trait.

mod layout;
mod tiff;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::Bitmap;

pub use layout::{content_pixel_size, fit_on_page, mm_to_px, page_pixel_size, Placement};
pub use tiff::TiffComposer;

/// Standard page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait dimensions in millimeters (width, height).
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// Options for composing pages into a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComposeOptions {
    pub page_size: PageSize,
    pub orientation: PageOrientation,
    /// Margin on all four sides, in millimeters.
    pub margin_mm: f64,
    /// Raster resolution of the composed pages.
    pub dpi: u32,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: PageOrientation::Portrait,
            margin_mm: 10.0,
            dpi: 300,
        }
    }
}

impl ComposeOptions {
    /// Page dimensions in millimeters with orientation applied.
    pub fn oriented_page_mm(&self) -> (f64, f64) {
        let (w, h) = self.page_size.dimensions_mm();
        match self.orientation {
            PageOrientation::Portrait => (w, h),
            PageOrientation::Landscape => (h, w),
        }
    }
}

/// Errors from the page-composition collaborator.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Composing requires at least one page.
    #[error("Cannot compose a document with no pages")]
    NoPages,

    /// A page image has no pixels.
    #[error("Page {index} has an empty image")]
    EmptyPage { index: usize },

    /// The document container could not be written.
    #[error("Failed to write document: {0}")]
    Write(String),
}

/// The external page-composition collaborator.
///
/// Implementations fit each image onto one page, preserving aspect ratio,
/// scaling down only, centered, pages in input order.
pub trait DocumentComposer {
    fn compose(&self, pages: &[Bitmap], options: &ComposeOptions) -> Result<Vec<u8>, ComposeError>;
}
