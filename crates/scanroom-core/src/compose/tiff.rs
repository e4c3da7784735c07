//! Multi-page TIFF document composition.
//!
//! Writes one TIFF image file directory per page. Pages are rasterized at
//! the configured resolution: a white canvas the size of the page, with the
//! fitted image drawn at the computed placement.

use std::io::Cursor;

use log::debug;
use tiff::encoder::{colortype, TiffEncoder};

use super::layout::{fit_on_page, page_pixel_size};
use super::{ComposeError, ComposeOptions, DocumentComposer};
use crate::decode::Bitmap;

/// A [`DocumentComposer`] producing a multi-page TIFF.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffComposer;

impl TiffComposer {
    pub fn new() -> Self {
        Self
    }

    /// Rasterize one page: white background, fitted image centered.
    fn rasterize_page(
        image: &Bitmap,
        options: &ComposeOptions,
        index: usize,
    ) -> Result<Bitmap, ComposeError> {
        if image.is_empty() {
            return Err(ComposeError::EmptyPage { index });
        }

        let (page_w, page_h) = page_pixel_size(options);
        let placement = fit_on_page(image.width, image.height, options);

        let scaled;
        let content: &Bitmap =
            if placement.width == image.width && placement.height == image.height {
                image
            } else {
                let rgb = image.to_rgb_image().ok_or(ComposeError::EmptyPage { index })?;
                let resized = image::imageops::resize(
                    &rgb,
                    placement.width,
                    placement.height,
                    image::imageops::FilterType::Lanczos3,
                );
                scaled = Bitmap::from_rgb_image(resized);
                &scaled
            };

        let mut page = Bitmap::filled(page_w, page_h, [255, 255, 255]);
        for y in 0..content.height {
            let src_start = (y * content.width * 3) as usize;
            let dst_start =
                (((placement.y + y) * page_w + placement.x) * 3) as usize;
            let row = (content.width * 3) as usize;
            page.pixels[dst_start..dst_start + row]
                .copy_from_slice(&content.pixels[src_start..src_start + row]);
        }
        Ok(page)
    }
}

impl DocumentComposer for TiffComposer {
    fn compose(&self, pages: &[Bitmap], options: &ComposeOptions) -> Result<Vec<u8>, ComposeError> {
        if pages.is_empty() {
            return Err(ComposeError::NoPages);
        }

        let mut cursor = Cursor::new(Vec::new());
        let mut encoder =
            TiffEncoder::new(&mut cursor).map_err(|e| ComposeError::Write(e.to_string()))?;

        for (index, image) in pages.iter().enumerate() {
            let page = Self::rasterize_page(image, options, index)?;
            encoder
                .write_image::<colortype::RGB8>(page.width, page.height, &page.pixels)
                .map_err(|e| ComposeError::Write(e.to_string()))?;
        }
        drop(encoder);

        let bytes = cursor.into_inner();
        debug!("composed {} pages into {} bytes of TIFF", pages.len(), bytes.len());
        Ok(bytes)
    }
}
