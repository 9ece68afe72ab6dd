// AI preview store
// Holds the suggested notes shown as a ghost overlay and the beat the next
// autocomplete request continues from.

use crate::state::{Note, SequencerId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewStore {
    /// Sequencer the pending suggestion belongs to
    pub sequencer_id: Option<SequencerId>,
    /// Suggested notes awaiting accept/reject
    pub notes: Vec<Note>,
    /// Beat the autocomplete marker sits on
    pub autocomplete_target_beat: Option<f64>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a suggestion for a track
    pub fn show(&mut self, sequencer_id: SequencerId, notes: Vec<Note>) {
        self.sequencer_id = Some(sequencer_id);
        self.notes = notes;
    }

    /// Whether a suggestion is currently displayed
    pub fn is_active(&self) -> bool {
        !self.notes.is_empty()
    }

    /// Drop the pending suggestion; the autocomplete marker is kept
    pub fn clear(&mut self) {
        self.sequencer_id = None;
        self.notes.clear();
    }
}
