//! Scanroom WASM - WebAssembly bindings for the Scanroom editing engine
//!
//! This crate exposes the scanroom-core engine to JavaScript/TypeScript
//! host UIs. It is deliberately thin: pointer events and option objects in,
//! previews, rectangles and encoded bytes out. All geometry, history and
//! compositing logic lives in the core.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for bitmaps and outputs
//! - `editor` - the single-image editor session and bitmap decoding
//! - `pages` - the multi-page capture session and document composition
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_capture, JsEditor } from '@scanroom/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const bitmap = decode_capture(bytes);
//! const editor = new JsEditor(bitmap, canvas.width, canvas.height);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod pages;
mod types;

// Re-export public types
pub use editor::{decode_capture, scale_to_fit, JsEditor};
pub use pages::JsPageSession;
pub use types::{JsBitmap, JsEncodedImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: install a panic hook forwarding to the browser console once
    // console_error_panic_hook is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
