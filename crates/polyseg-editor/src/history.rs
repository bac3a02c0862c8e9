//! Linear undo/redo history.
//!
//! Each entry is a full snapshot of the polygon list. A cursor points at
//! the current entry; committing truncates everything after it, so the
//! redo branch is discarded. Only discrete user actions commit. Drag
//! frames and panning never do.
//!
//! Entries carry a monotonically increasing revision number. The "saved"
//! marker refers to a revision rather than a position, so dropping old
//! entries under a depth limit never moves it onto the wrong snapshot.

use polyseg_core::Polygon;

#[derive(Debug, Clone)]
struct Entry {
    revision: u64,
    polygons: Vec<Polygon>,
}

/// Snapshot history with a cursor and a saved marker.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Entry>,
    cursor: usize,
    next_revision: u64,
    saved_revision: Option<u64>,
    /// Maximum number of entries kept (`None` = unbounded).
    max_depth: Option<usize>,
}

impl History {
    /// A history holding only `initial`, which counts as saved.
    pub fn new(initial: Vec<Polygon>, max_depth: Option<usize>) -> Self {
        Self {
            entries: vec![Entry {
                revision: 0,
                polygons: initial,
            }],
            cursor: 0,
            next_revision: 1,
            saved_revision: Some(0),
            max_depth: max_depth.map(|d| d.max(1)),
        }
    }

    /// Discard everything and start over from `initial`.
    pub fn reset(&mut self, initial: Vec<Polygon>) {
        *self = Self::new(initial, self.max_depth);
    }

    /// Record a new current state.
    pub fn commit(&mut self, polygons: Vec<Polygon>) {
        self.entries.truncate(self.cursor + 1);
        let revision = self.next_revision;
        self.next_revision += 1;
        self.entries.push(Entry { revision, polygons });

        if let Some(max) = self.max_depth
            && self.entries.len() > max
        {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
        log::debug!(
            "history: commit r{revision} ({} entries, dirty={})",
            self.entries.len(),
            self.has_unsaved_changes()
        );
    }

    /// Step back. Returns the restored snapshot, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&[Polygon]> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        log::debug!("history: undo to r{}", self.entries[self.cursor].revision);
        Some(&self.entries[self.cursor].polygons)
    }

    /// Step forward. Returns the restored snapshot, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&[Polygon]> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        log::debug!("history: redo to r{}", self.entries[self.cursor].revision);
        Some(&self.entries[self.cursor].polygons)
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &[Polygon] {
        &self.entries[self.cursor].polygons
    }

    /// Revision of the snapshot at the cursor. Stable across trimming.
    pub fn current_revision(&self) -> u64 {
        self.entries[self.cursor].revision
    }

    /// Mark the current entry as saved.
    pub fn mark_saved(&mut self) {
        self.saved_revision = Some(self.current_revision());
    }

    /// Mark a specific revision as saved (a save that completed after
    /// further edits were made).
    pub fn mark_saved_revision(&mut self, revision: u64) {
        self.saved_revision = Some(revision);
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.saved_revision != Some(self.current_revision())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Position of the saved entry, if it is still in the history.
    pub fn saved_cursor(&self) -> Option<usize> {
        let saved = self.saved_revision?;
        self.entries.iter().position(|e| e.revision == saved)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}
