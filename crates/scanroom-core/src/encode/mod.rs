//! Output encoding for Scanroom: lossless PNG with a high-quality JPEG
//! fallback. Synchronous, like the rest of the engine; the host runs it off
//! the interaction thread.

mod output;

pub use output::{encode_output, EncodeError, EncodedImage, OutputFormat, FALLBACK_JPEG_QUALITY};
