//! Bitmap loading for Scanroom.
//!
//! This module turns capture or file-selection bytes into the natural-size
//! [`Bitmap`] that an edit session works on:
//!
//! - Format-guessed decoding (JPEG, PNG)
//! - EXIF orientation normalization for camera captures
//! - Downscaling to a preview-sized working copy
//!
//! All operations are synchronous; the host schedules them off the
//! interaction thread and feeds the result back through the session's task
//! gate.

mod loader;
mod types;

pub use loader::{decode_bitmap, fit_within, Orientation};
pub use types::{Bitmap, DecodeError};
