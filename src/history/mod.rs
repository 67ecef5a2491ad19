//! Linear undo/redo history of content snapshots.
//!
//! The history is an ordered list of [`Snapshot`]s plus a cursor naming the
//! one currently displayed. Recording while the cursor is behind the tail
//! discards the redo branch first; there is no branching history.

use crate::draw::Snapshot;
use log::{debug, trace};

/// Default number of snapshots kept before the oldest are dropped.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// One recorded snapshot.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Monotonic id for diagnostics only; ordering is positional.
    pub id: u64,
    pub snapshot: Snapshot,
}

/// Undo/redo stack of snapshots with a cursor.
///
/// Invariant: when non-empty, `cursor < entries.len()` and the entry at the
/// cursor is the one currently shown.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    next_id: u64,
    /// Maximum retained entries (0 = unlimited)
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl History {
    /// Creates an empty history keeping at most `max_entries` snapshots (0 = unlimited).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            next_id: 1,
            max_entries,
        }
    }

    /// Appends a snapshot, dropping everything after the cursor first.
    ///
    /// Returns the diagnostic id assigned to the entry.
    pub fn record(&mut self, snapshot: Snapshot) -> u64 {
        if !self.entries.is_empty() && self.cursor + 1 < self.entries.len() {
            let discarded = self.entries.len() - (self.cursor + 1);
            self.entries.truncate(self.cursor + 1);
            debug!("Discarded {discarded} redo entr(y/ies)");
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(HistoryEntry { id, snapshot });
        self.cursor = self.entries.len() - 1;

        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
            self.cursor -= overflow;
            trace!("History limit {} reached; dropped {overflow} oldest", self.max_entries);
        }

        trace!("Recorded snapshot #{id} at position {}", self.cursor);
        id
    }

    /// Steps back one snapshot. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.entries.is_empty() || self.cursor == 0 {
            debug!("Nothing to undo");
            return None;
        }
        self.cursor -= 1;
        let entry = &self.entries[self.cursor];
        debug!("Undo to snapshot #{}", entry.id);
        Some(entry.snapshot.clone())
    }

    /// Steps forward one snapshot. `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            debug!("Nothing to redo");
            return None;
        }
        self.cursor += 1;
        let entry = &self.entries[self.cursor];
        debug!("Redo to snapshot #{}", entry.id);
        Some(entry.snapshot.clone())
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Distinct 1x1 snapshot tagged by its pixel value.
    fn snap(tag: u8) -> Snapshot {
        Snapshot::encode(1, 1, 4, &[tag, tag, tag, 255]).unwrap()
    }

    fn tags(history: &History) -> Vec<u8> {
        history
            .entries()
            .iter()
            .map(|e| e.snapshot.decode().unwrap().data[0])
            .collect()
    }

    #[test]
    fn empty_history_has_nothing_to_do() {
        let mut history = History::default();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.current().is_none());
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn undo_on_single_entry_is_noop() {
        let mut history = History::default();
        history.record(snap(1));
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), Some(0));
    }

    #[test]
    fn redo_at_tail_is_noop() {
        let mut history = History::default();
        history.record(snap(1));
        history.record(snap(2));
        assert!(history.redo().is_none());
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn undo_and_redo_move_cursor() {
        let mut history = History::default();
        history.record(snap(1));
        history.record(snap(2));
        history.record(snap(3));

        assert_eq!(history.undo(), Some(snap(2)));
        assert_eq!(history.undo(), Some(snap(1)));
        assert!(history.undo().is_none());
        assert_eq!(history.redo(), Some(snap(2)));
        assert_eq!(history.current().unwrap().snapshot, snap(2));
        assert!(history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn record_after_undo_truncates_redo_branch() {
        let mut history = History::default();
        history.record(snap(b'A'));
        history.record(snap(b'B'));
        history.record(snap(b'C'));

        assert_eq!(history.undo(), Some(snap(b'B')));
        history.record(snap(b'D'));

        assert_eq!(tags(&history), vec![b'A', b'B', b'D']);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.current().unwrap().snapshot, snap(b'D'));
        assert!(history.redo().is_none());
    }

    #[test]
    fn ids_increase_even_after_truncation() {
        let mut history = History::default();
        let a = history.record(snap(1));
        let b = history.record(snap(2));
        history.undo();
        let c = history.record(snap(3));
        assert!(a < b && b < c);
    }

    #[test]
    fn limit_drops_oldest_and_keeps_cursor_on_newest() {
        let mut history = History::new(3);
        for tag in 1..=5 {
            history.record(snap(tag));
        }
        assert_eq!(tags(&history), vec![3, 4, 5]);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.undo(), Some(snap(4)));
        assert_eq!(history.undo(), Some(snap(3)));
        assert!(history.undo().is_none());
    }

    #[test]
    fn zero_limit_is_unbounded() {
        let mut history = History::new(0);
        for tag in 0..=200u8 {
            history.record(snap(tag));
        }
        assert_eq!(history.len(), 201);
    }
}
