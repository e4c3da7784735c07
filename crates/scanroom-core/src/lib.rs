//! Scanroom Core - photo capture editing engine
//!
//! This crate provides the headless engine behind Scanroom's capture flow:
//! interactive cropping with eight resize handles, rotation and flipping
//! with live preview, bounded branch-truncating undo/redo, pixel-exact
//! final output, and multi-page capture sessions composed into a document.
//!
//! The engine is pure data and pure functions plus one explicit session
//! object per edited image; a thin adapter (see the `scanroom-wasm` crate)
//! translates host pointer events into screen coordinates and renders the
//! rectangles and previews the engine computes. Everything here is testable
//! without a UI.

pub mod compose;
pub mod decode;
pub mod edit;
pub mod encode;
pub mod geometry;
pub mod pages;
pub mod render;
pub mod session;

pub use compose::{ComposeError, ComposeOptions, DocumentComposer, PageOrientation, PageSize, TiffComposer};
pub use decode::{decode_bitmap, Bitmap, DecodeError};
pub use edit::{DragKind, DragSession, EditState, FlipAxis, HistorySnapshot, HistoryStack, HISTORY_CAP};
pub use encode::{EncodeError, EncodedImage, OutputFormat};
pub use geometry::{CoordinateMapper, CropRect, Handle, ScreenPoint, ScreenRect, MIN_CROP_SIZE};
pub use pages::{MultiPageSession, PageId, PageSessionError, DEFAULT_PAGE_LIMIT};
pub use render::{InterpolationFilter, RenderError};
pub use session::{EditorError, EditorSession, SessionPhase, HANDLE_HIT_RADIUS};
