//! WASM bindings for the multi-page capture session.
//!
//! `JsPageSession` drives the ordered page list and forwards editing
//! gestures to the selected page's editor. Compose options cross the
//! boundary as a plain JavaScript object, e.g.
//! `{ pageSize: "A4", orientation: "Portrait", marginMm: 10, dpi: 300 }`.

use scanroom_core::{
    ComposeOptions, FlipAxis, MultiPageSession, PageId, ScreenPoint, TiffComposer,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::types::{to_js_error, JsBitmap};

/// Compose options as they arrive from JavaScript.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsComposeOptions {
    page_size: Option<String>,
    orientation: Option<String>,
    margin_mm: Option<f64>,
    dpi: Option<u32>,
}

impl JsComposeOptions {
    fn into_options(self) -> Result<ComposeOptions, JsValue> {
        use scanroom_core::{PageOrientation, PageSize};

        let mut options = ComposeOptions::default();
        if let Some(size) = self.page_size {
            options.page_size = match size.as_str() {
                "A4" => PageSize::A4,
                "Letter" => PageSize::Letter,
                "Legal" => PageSize::Legal,
                other => return Err(JsValue::from_str(&format!("Unknown page size: {other}"))),
            };
        }
        if let Some(orientation) = self.orientation {
            options.orientation = match orientation.as_str() {
                "Portrait" => PageOrientation::Portrait,
                "Landscape" => PageOrientation::Landscape,
                other => return Err(JsValue::from_str(&format!("Unknown orientation: {other}"))),
            };
        }
        if let Some(margin) = self.margin_mm {
            options.margin_mm = margin;
        }
        if let Some(dpi) = self.dpi {
            options.dpi = dpi;
        }
        Ok(options)
    }
}

/// A multi-page capture session.
#[wasm_bindgen]
pub struct JsPageSession {
    inner: MultiPageSession,
}

#[wasm_bindgen]
impl JsPageSession {
    /// Open a session with the given page limit and viewport size.
    #[wasm_bindgen(constructor)]
    pub fn new(max_pages: usize, viewport_width: f64, viewport_height: f64) -> JsPageSession {
        JsPageSession {
            inner: MultiPageSession::new(max_pages, viewport_width, viewport_height),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    /// Page ids in display order.
    pub fn page_ids(&self) -> Vec<u64> {
        self.inner.page_ids().iter().map(|id| id.value()).collect()
    }

    /// Id of the selected page, or undefined when the session is empty.
    #[wasm_bindgen(getter)]
    pub fn selected_page(&self) -> Option<u64> {
        self.inner.selected_page().map(PageId::value)
    }

    /// Append a captured bitmap as a new page and select it. Throws a
    /// limit notice when the session is full; nothing changes in that case.
    pub fn add_page(&mut self, image: &JsBitmap) -> Result<u64, JsValue> {
        let id = self.inner.add_page(image.to_bitmap()).map_err(to_js_error)?;
        Ok(id.value())
    }

    pub fn select_page(&mut self, id: u64) -> Result<(), JsValue> {
        self.inner
            .select_page(PageId::from_raw(id))
            .map_err(to_js_error)
    }

    pub fn delete_page(&mut self, id: u64) -> Result<(), JsValue> {
        self.inner
            .delete_page(PageId::from_raw(id))
            .map_err(to_js_error)
    }

    /// Move the page at `from` to position `to`; the selected page keeps
    /// its identity.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.inner.reorder(from, to).map_err(to_js_error)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.inner.set_viewport(width, height);
    }

    // Editing forwards to the selected page's editor. Gestures on an empty
    // session report false; edits report an error.

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.inner
            .editor()
            .map(|e| e.drag_start(ScreenPoint::new(x, y)))
            .unwrap_or(false)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.inner
            .editor()
            .map(|e| e.drag_update(ScreenPoint::new(x, y)))
            .unwrap_or(false)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.inner.editor().map(|e| e.drag_end()).unwrap_or(false)
    }

    pub fn set_rotation(&mut self, degrees: i32) -> Result<(), JsValue> {
        match self.inner.editor() {
            Some(editor) => editor.set_rotation(degrees).map_err(to_js_error),
            None => Err(JsValue::from_str("No page selected")),
        }
    }

    pub fn flip_horizontal(&mut self) -> Result<(), JsValue> {
        match self.inner.editor() {
            Some(editor) => editor.toggle_flip(FlipAxis::Horizontal).map_err(to_js_error),
            None => Err(JsValue::from_str("No page selected")),
        }
    }

    pub fn flip_vertical(&mut self) -> Result<(), JsValue> {
        match self.inner.editor() {
            Some(editor) => editor.toggle_flip(FlipAxis::Vertical).map_err(to_js_error),
            None => Err(JsValue::from_str("No page selected")),
        }
    }

    pub fn undo(&mut self) -> bool {
        self.inner.editor().map(|e| e.undo()).unwrap_or(false)
    }

    pub fn redo(&mut self) -> bool {
        self.inner.editor().map(|e| e.redo()).unwrap_or(false)
    }

    pub fn apply_crop(&mut self) -> Result<(), JsValue> {
        match self.inner.editor() {
            Some(editor) => editor.apply_crop().map_err(to_js_error),
            None => Err(JsValue::from_str("No page selected")),
        }
    }

    /// Render the selected page's preview frame.
    pub fn render_preview(&mut self) -> Result<JsBitmap, JsValue> {
        match self.inner.editor() {
            Some(editor) => {
                let preview = editor.render_preview().map_err(to_js_error)?;
                Ok(JsBitmap::from_bitmap(preview))
            }
            None => Err(JsValue::from_str("No page selected")),
        }
    }

    /// The selected page's crop overlay rectangle in viewport coordinates.
    pub fn overlay_rect(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.editor() {
            Some(editor) => {
                serde_wasm_bindgen::to_value(&editor.overlay_rect()).map_err(to_js_error)
            }
            None => Err(JsValue::from_str("No page selected")),
        }
    }

    /// Compose all pages, in order, into a multi-page TIFF document.
    ///
    /// On success the session is emptied; on failure the pages stay so the
    /// call can be retried.
    pub fn finalize(&mut self, options: JsValue) -> Result<Vec<u8>, JsValue> {
        let options = if options.is_undefined() || options.is_null() {
            ComposeOptions::default()
        } else {
            serde_wasm_bindgen::from_value::<JsComposeOptions>(options)
                .map_err(to_js_error)?
                .into_options()?
        };
        self.inner
            .finalize(&TiffComposer::new(), &options)
            .map_err(to_js_error)
    }
}
