//! Bounded, branch-truncating undo/redo history of edit snapshots.
//!
//! The stack holds at most [`HISTORY_CAP`] snapshots and a current index.
//! Pushing from the middle of the stack prunes the redo branch first;
//! pushing at capacity evicts the oldest entry and shifts the index down by
//! one, preserving the current position relative to the surviving entries.
//!
//! Snapshots taken by image-replacing operations (crop apply, load) carry
//! the bitmap that became current at that point; pure parameter changes
//! (rotation, flip, crop-rect drags) carry none and are reconstructed from
//! the live bitmap plus their [`EditState`]. Bitmaps are shared via `Arc`,
//! so snapshots are cheap to copy and restore verbatim.

use std::sync::Arc;

use crate::decode::Bitmap;
use crate::edit::EditState;

/// Maximum number of snapshots retained.
pub const HISTORY_CAP: usize = 50;

/// One entry in the undo/redo history.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    pub state: EditState,
    /// Present when the operation replaced the working bitmap.
    pub bitmap: Option<Arc<Bitmap>>,
}

impl HistorySnapshot {
    /// A parameter-only snapshot (no bitmap replacement).
    pub fn of_state(state: EditState) -> Self {
        Self {
            state,
            bitmap: None,
        }
    }

    /// A snapshot of an operation that replaced the working bitmap.
    pub fn with_bitmap(state: EditState, bitmap: Arc<Bitmap>) -> Self {
        Self {
            state,
            bitmap: Some(bitmap),
        }
    }
}

/// Bounded undo/redo log of [`HistorySnapshot`] entries.
///
/// Invariant: `0 <= index < len() <= HISTORY_CAP`, and the stack is never
/// empty (it is created with the initial snapshot).
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<HistorySnapshot>,
    index: usize,
    /// Set by reset-all: entries beyond the index survive in memory but are
    /// no longer reachable via redo. Cleared by the next push.
    redo_blocked: bool,
}

impl HistoryStack {
    /// Create a stack holding the initial snapshot.
    pub fn new(initial: HistorySnapshot) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            redo_blocked: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_blocked && self.index + 1 < self.entries.len()
    }

    /// The snapshot at the current index.
    pub fn current(&self) -> &HistorySnapshot {
        &self.entries[self.index]
    }

    /// The bitmap in effect at the current index: the nearest snapshot at or
    /// before the index that carries one.
    pub fn current_bitmap(&self) -> Option<&Arc<Bitmap>> {
        self.entries[..=self.index]
            .iter()
            .rev()
            .find_map(|snap| snap.bitmap.as_ref())
    }

    /// Push a new snapshot after the current index.
    ///
    /// Entries beyond the index (the redo branch) are discarded first. If
    /// the stack would exceed [`HISTORY_CAP`], the oldest entry is evicted
    /// and the index shifted down by one; an evicted bitmap is re-attached
    /// to the new oldest entry when that entry carries none, so every
    /// prefix of the history still resolves to a concrete bitmap.
    pub fn push(&mut self, snapshot: HistorySnapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index += 1;
        self.redo_blocked = false;

        if self.entries.len() > HISTORY_CAP {
            let evicted = self.entries.remove(0);
            self.index -= 1;
            if self.entries[0].bitmap.is_none() {
                self.entries[0].bitmap = evicted.bitmap;
            }
        }
    }

    /// Step back one snapshot. No-op at the oldest entry.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward one snapshot. No-op at the newest entry or after a
    /// reset-all.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// Return to the beginning of the history, overwriting entry 0 with the
    /// given original snapshot.
    ///
    /// Later entries are kept in memory but entry 0 is now the only
    /// semantically original state: redo is disabled until the next push,
    /// which prunes the stale entries as usual.
    pub fn reset_all(&mut self, original: HistorySnapshot) -> &HistorySnapshot {
        self.entries[0] = original;
        self.index = 0;
        self.redo_blocked = true;
        &self.entries[0]
    }

    /// Drop all entries except the current one. Used on session teardown to
    /// release retained bitmaps.
    pub fn release(&mut self) {
        let current = self.entries.swap_remove(self.index);
        self.entries.clear();
        self.entries.push(current);
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CropRect;

    fn state_with_rotation(deg: i32) -> EditState {
        let mut s = EditState::identity(1000, 800);
        s.set_rotation(deg);
        s
    }

    fn stack() -> HistoryStack {
        HistoryStack::new(HistorySnapshot::with_bitmap(
            EditState::identity(1000, 800),
            Arc::new(Bitmap::filled(4, 4, [7, 7, 7])),
        ))
    }

    #[test]
    fn test_new_stack_has_initial_entry() {
        let h = stack();
        assert_eq!(h.len(), 1);
        assert_eq!(h.index(), 0);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.current_bitmap().is_some());
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(10))); // S1
        h.push(HistorySnapshot::of_state(state_with_rotation(20))); // S2
        h.push(HistorySnapshot::of_state(state_with_rotation(30))); // S3

        h.undo();
        h.undo();
        assert_eq!(h.current().state, state_with_rotation(10));

        let redone = h.redo().unwrap();
        assert_eq!(redone.state, state_with_rotation(20));
    }

    #[test]
    fn test_undo_then_redo_restores_exactly() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(45)));

        let before = h.current().state;
        h.undo();
        let after = h.redo().unwrap().state;
        assert_eq!(before, after);
    }

    #[test]
    fn test_undo_at_bottom_is_noop() {
        let mut h = stack();
        assert!(h.undo().is_none());
        assert_eq!(h.index(), 0);
    }

    #[test]
    fn test_redo_at_top_is_noop() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(10)));
        assert!(h.redo().is_none());
        assert_eq!(h.index(), 1);
    }

    #[test]
    fn test_push_prunes_redo_branch() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(10)));
        h.push(HistorySnapshot::of_state(state_with_rotation(20)));
        h.undo();

        h.push(HistorySnapshot::of_state(state_with_rotation(99)));
        assert_eq!(h.len(), 3);
        assert!(!h.can_redo());
        assert_eq!(h.current().state, state_with_rotation(99));
    }

    #[test]
    fn test_cap_evicts_oldest_and_shifts_index() {
        let mut h = stack();
        for i in 0..(HISTORY_CAP - 1) {
            h.push(HistorySnapshot::of_state(state_with_rotation(i as i32)));
        }
        assert_eq!(h.len(), HISTORY_CAP);
        assert_eq!(h.index(), HISTORY_CAP - 1);

        // The 51st snapshot evicts the initial entry and decrements index by 1
        h.push(HistorySnapshot::of_state(state_with_rotation(777)));
        assert_eq!(h.len(), HISTORY_CAP);
        assert_eq!(h.index(), HISTORY_CAP - 1);
        assert_eq!(h.current().state, state_with_rotation(777));
    }

    #[test]
    fn test_eviction_preserves_image_bearing_prefix() {
        let mut h = stack();
        for i in 0..HISTORY_CAP {
            h.push(HistorySnapshot::of_state(state_with_rotation(i as i32)));
        }
        // The initial (bitmap-carrying) entry was evicted; its bitmap must
        // have been re-attached to the new oldest entry.
        while h.undo().is_some() {}
        assert!(h.current_bitmap().is_some());
    }

    #[test]
    fn test_current_bitmap_scans_back() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(10)));
        let replacement = Arc::new(Bitmap::filled(2, 2, [1, 2, 3]));
        h.push(HistorySnapshot::with_bitmap(
            state_with_rotation(10),
            Arc::clone(&replacement),
        ));
        h.push(HistorySnapshot::of_state(state_with_rotation(20)));

        assert!(Arc::ptr_eq(h.current_bitmap().unwrap(), &replacement));

        h.undo(); // back onto the replacement snapshot
        assert!(Arc::ptr_eq(h.current_bitmap().unwrap(), &replacement));

        h.undo(); // before the replacement: the initial bitmap again
        assert!(!Arc::ptr_eq(h.current_bitmap().unwrap(), &replacement));
    }

    #[test]
    fn test_reset_all_overwrites_entry_zero() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(10)));
        h.push(HistorySnapshot::of_state(state_with_rotation(20)));

        let original = HistorySnapshot::with_bitmap(
            EditState::identity(1000, 800),
            Arc::new(Bitmap::filled(4, 4, [9, 9, 9])),
        );
        let restored = h.reset_all(original);
        assert!(restored.state.is_identity(1000, 800));
        assert_eq!(h.index(), 0);
        // Later entries survive but entry 0 is the only original state now
        assert_eq!(h.len(), 3);
        assert!(!h.can_redo());
        assert!(h.redo().is_none());
    }

    #[test]
    fn test_push_after_reset_prunes_stale_entries() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(10)));
        h.push(HistorySnapshot::of_state(state_with_rotation(20)));
        h.reset_all(HistorySnapshot::with_bitmap(
            EditState::identity(1000, 800),
            Arc::new(Bitmap::filled(4, 4, [9, 9, 9])),
        ));

        h.push(HistorySnapshot::of_state(state_with_rotation(5)));
        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert!(h.can_undo());
    }

    #[test]
    fn test_release_keeps_only_current() {
        let mut h = stack();
        h.push(HistorySnapshot::of_state(state_with_rotation(10)));
        h.push(HistorySnapshot::of_state(state_with_rotation(20)));
        h.undo();

        let kept = h.current().state;
        h.release();
        assert_eq!(h.len(), 1);
        assert_eq!(h.index(), 0);
        assert_eq!(h.current().state, kept);
    }

    #[test]
    fn test_snapshot_crop_rect_round_trip() {
        let mut h = stack();
        let mut s = EditState::identity(1000, 800);
        s.crop_rect = CropRect::new(12.5, 7.25, 512.0, 384.0);
        h.push(HistorySnapshot::of_state(s));

        h.undo();
        let restored = h.redo().unwrap().state;
        assert_eq!(restored.crop_rect, s.crop_rect);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
