// Live sequencer controllers
//
// A controller is the on-screen, non-serializable counterpart of one
// SequencerState: it owns the mount point in the UI and the audio binding.
// Controllers live outside the snapshot and are keyed by sequencer id.

use crate::state::{SequencerId, SequencerState};
use std::collections::HashMap;
use uuid::Uuid;

/// Live UI/audio object bound to one sequencer track
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerController {
    /// Identity of this particular instance; a re-created controller gets a new one
    pub instance_id: Uuid,
    pub sequencer_id: SequencerId,
    /// UI container the controller is mounted in
    pub container: String,
    pub instrument: String,
    /// Instrument whose samples finished loading, if any
    pub loaded_instrument: Option<String>,
    pub volume: f64,
    pub pan: f64,
    pub collapsed: bool,
    pub note_count: usize,
}

impl SequencerController {
    /// Build a controller mirroring `sequencer`, mounted in `container`
    pub fn mount(sequencer: &SequencerState, container: impl Into<String>) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            sequencer_id: sequencer.id,
            container: container.into(),
            instrument: sequencer.instrument.clone(),
            loaded_instrument: None,
            volume: sequencer.volume,
            pan: sequencer.pan,
            collapsed: sequencer.collapsed,
            note_count: sequencer.notes.len(),
        }
    }

    /// Copy the track fields the controller displays
    pub fn mirror(&mut self, sequencer: &SequencerState) {
        if self.instrument != sequencer.instrument {
            self.loaded_instrument = None;
        }
        self.instrument = sequencer.instrument.clone();
        self.volume = sequencer.volume;
        self.pan = sequencer.pan;
        self.collapsed = sequencer.collapsed;
        self.note_count = sequencer.notes.len();
    }

    /// Whether the controller shows exactly what the track holds
    pub fn matches(&self, sequencer: &SequencerState) -> bool {
        self.sequencer_id == sequencer.id
            && self.instrument == sequencer.instrument
            && self.volume == sequencer.volume
            && self.pan == sequencer.pan
            && self.collapsed == sequencer.collapsed
            && self.note_count == sequencer.notes.len()
    }
}

/// Registry of live controllers keyed by sequencer id
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<SequencerId, SequencerController>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller, replacing any previous one for the same id
    pub fn register(&mut self, controller: SequencerController) -> Option<SequencerController> {
        self.controllers.insert(controller.sequencer_id, controller)
    }

    /// Remove and return the controller of a sequencer
    pub fn unregister(&mut self, id: SequencerId) -> Option<SequencerController> {
        self.controllers.remove(&id)
    }

    pub fn get(&self, id: SequencerId) -> Option<&SequencerController> {
        self.controllers.get(&id)
    }

    pub fn get_mut(&mut self, id: SequencerId) -> Option<&mut SequencerController> {
        self.controllers.get_mut(&id)
    }

    pub fn contains(&self, id: SequencerId) -> bool {
        self.controllers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Sorted ids of all registered controllers
    pub fn ids(&self) -> Vec<SequencerId> {
        let mut ids: Vec<_> = self.controllers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Drop every controller
    pub fn clear(&mut self) -> usize {
        let count = self.controllers.len();
        self.controllers.clear();
        count
    }
}
