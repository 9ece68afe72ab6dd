// History - cursor-addressed list of (forward, reverse) diff pairs
//
// entries[..cursor] have been applied and can be undone; entries[cursor..]
// were undone and can be redone. Recording a new pair while cursor is not at
// the end drops the abandoned redo branch.
//
// The history also owns the live snapshot: record, undo and redo are the
// only code paths that replace it.

pub mod entry;

pub use entry::HistoryEntry;

use crate::diff::{Diff, apply_diff};
use crate::runtime::RuntimeSyncContext;
use crate::state::AppState;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default maximum number of entries to keep
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Undo/redo history plus the snapshot it produced
pub struct History {
    /// Live snapshot
    snapshot: Arc<AppState>,

    /// Recorded pairs, oldest first
    entries: VecDeque<HistoryEntry>,

    /// Index of the next redo slot
    cursor: usize,

    /// Maximum number of entries; 0 means unbounded
    max_history: usize,

    /// Bumped on every snapshot replacement
    revision: u64,
}

impl History {
    /// Start a history at `initial` with the default depth
    pub fn new(initial: AppState) -> Self {
        Self::with_capacity(initial, DEFAULT_MAX_HISTORY)
    }

    /// Start a history with a custom depth limit (0 = unbounded)
    pub fn with_capacity(initial: AppState, max_history: usize) -> Self {
        Self {
            snapshot: Arc::new(initial),
            entries: VecDeque::new(),
            cursor: 0,
            max_history,
            revision: 0,
        }
    }

    /// Apply `forward`, then record the pair
    ///
    /// Any entries past the cursor are discarded first. Returns the new
    /// live snapshot.
    ///
    /// A CREATE_SEQUENCER reusing a live id is not recorded: its reverse
    /// would delete the track that already owns the id.
    pub fn record(
        &mut self,
        forward: Diff,
        reverse: Diff,
        runtime: &mut dyn RuntimeSyncContext,
    ) -> Arc<AppState> {
        if let Diff::CreateSequencer { sequencer_id, .. } = &forward {
            if self.snapshot.sequencer(*sequencer_id).is_some() {
                log::warn!(
                    "Sequencer {} already exists, CREATE_SEQUENCER not recorded",
                    sequencer_id
                );
                return Arc::clone(&self.snapshot);
            }
        }

        let next = apply_diff(&self.snapshot, &forward, runtime);

        if self.cursor < self.entries.len() {
            log::debug!(
                "Discarding {} redo entries",
                self.entries.len() - self.cursor
            );
            self.entries.truncate(self.cursor);
        }

        log::debug!("Recorded {}", forward.kind());
        self.entries.push_back(HistoryEntry::new(forward, reverse));
        self.cursor += 1;

        // Trim history if needed
        if self.max_history > 0 && self.entries.len() > self.max_history {
            self.entries.pop_front();
            self.cursor -= 1;
        }

        self.replace(next)
    }

    /// Undo the entry before the cursor
    ///
    /// Returns the description of the undone change, or None when there is
    /// nothing to undo.
    pub fn undo(&mut self, runtime: &mut dyn RuntimeSyncContext) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }

        self.cursor -= 1;
        let entry = &self.entries[self.cursor];
        let description = entry.description();
        let next = apply_diff(&self.snapshot, &entry.reverse, runtime);
        log::debug!("Undo: {}", description);

        self.replace(next);
        Some(description)
    }

    /// Redo the entry at the cursor
    ///
    /// Returns the description of the redone change, or None when there is
    /// nothing to redo.
    pub fn redo(&mut self, runtime: &mut dyn RuntimeSyncContext) -> Option<String> {
        let entry = self.entries.get(self.cursor)?;
        let description = entry.description();
        let next = apply_diff(&self.snapshot, &entry.forward, runtime);
        log::debug!("Redo: {}", description);

        self.cursor += 1;
        self.replace(next);
        Some(description)
    }

    fn replace(&mut self, next: Arc<AppState>) -> Arc<AppState> {
        self.snapshot = next;
        self.revision += 1;
        Arc::clone(&self.snapshot)
    }

    /// Start over from `state` with an empty history
    pub fn reset(&mut self, state: AppState) {
        self.entries.clear();
        self.cursor = 0;
        self.replace(Arc::new(state));
    }

    /// Drop every entry, keeping the live snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// The live snapshot
    pub fn snapshot(&self) -> &Arc<AppState> {
        &self.snapshot
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Description of the change undo would revert
    pub fn undo_description(&self) -> Option<String> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(HistoryEntry::description)
    }

    /// Description of the change redo would reapply
    pub fn redo_description(&self) -> Option<String> {
        self.entries.get(self.cursor).map(HistoryEntry::description)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Counter bumped every time the live snapshot is replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
