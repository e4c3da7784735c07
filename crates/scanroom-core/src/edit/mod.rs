//! Edit-state machinery: the per-image [`EditState`], the transient
//! [`DragSession`] that interprets pointer gestures, and the bounded
//! [`HistoryStack`] of undo/redo snapshots.

mod drag;
mod history;
mod state;

pub use drag::{DragKind, DragSession};
pub use history::{HistorySnapshot, HistoryStack, HISTORY_CAP};
pub use state::{EditState, FlipAxis};
