// State - the song snapshot
//
// AppState is the single source of truth for the song. It is treated as an
// immutable value: the live snapshot is shared as Arc<AppState> and every
// change produces a new AppState through the diff appliers. Nothing outside
// crate::diff::apply builds a modified copy.

pub mod note;
pub mod song_key;
pub mod timing;

pub use note::{DEFAULT_VELOCITY, Note};
pub use song_key::{SongKey, SongKeyParseError};
pub use timing::TimeSignature;

use serde::{Deserialize, Serialize};

/// Stable, externally assigned identifier of a sequencer track
pub type SequencerId = u32;

/// Default mix values for a freshly created track
pub const DEFAULT_TRACK_VOLUME: f64 = 0.8;
pub const DEFAULT_TRACK_PAN: f64 = 0.0;

/// One musical track of the song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencerState {
    /// Unique track id; the only stable identity in the model
    pub id: SequencerId,
    /// Instrument path as "engine/library/name"
    pub instrument: String,
    pub notes: Vec<Note>,
    /// Track volume (0.0 - 1.0)
    pub volume: f64,
    /// Track pan (-1.0 left, 0.0 center, 1.0 right)
    pub pan: f64,
    /// Track is folded in the UI
    pub collapsed: bool,
}

impl SequencerState {
    /// Creates an empty track with default mix settings
    pub fn new(id: SequencerId, instrument: impl Into<String>) -> Self {
        Self {
            id,
            instrument: instrument.into(),
            notes: Vec::new(),
            volume: DEFAULT_TRACK_VOLUME,
            pan: DEFAULT_TRACK_PAN,
            collapsed: false,
        }
    }

    /// Split the instrument path into (engine, library, name)
    ///
    /// Returns None when the path is not a three-part triple.
    pub fn instrument_parts(&self) -> Option<(&str, &str, &str)> {
        let mut parts = self.instrument.splitn(3, '/');
        let engine = parts.next()?;
        let library = parts.next()?;
        let name = parts.next()?;
        if engine.is_empty() || library.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some((engine, library, name))
    }

    /// Latest note end in beats, if the track has notes
    pub fn last_note_end(&self) -> Option<f64> {
        self.notes.iter().map(Note::end).reduce(f64::max)
    }
}

/// Complete state of the song at one point in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Tempo in BPM
    pub tempo: f64,
    pub time_signature: TimeSignature,
    pub total_measures: u32,
    pub song_key: SongKey,
    /// Grid snap in beats (0.25 = sixteenth note)
    pub snap_resolution: f64,
    /// Length of newly placed notes in beats
    pub note_duration: f64,
    pub is_triplet_mode: bool,
    pub is_dotted_mode: bool,
    pub sequencers: Vec<SequencerState>,
}

impl AppState {
    /// Find a sequencer by id
    pub fn sequencer(&self, id: SequencerId) -> Option<&SequencerState> {
        self.sequencers.iter().find(|s| s.id == id)
    }

    /// Position of a sequencer in the track list
    pub fn sequencer_index(&self, id: SequencerId) -> Option<usize> {
        self.sequencers.iter().position(|s| s.id == id)
    }

    pub(crate) fn sequencer_mut(&mut self, id: SequencerId) -> Option<&mut SequencerState> {
        self.sequencers.iter_mut().find(|s| s.id == id)
    }

    /// Song length in quarter-note beats
    pub fn song_length_beats(&self) -> f64 {
        self.time_signature.song_length_beats(self.total_measures)
    }

    /// Lowest id not used by any sequencer
    ///
    /// Callers assign ids before building a CREATE_SEQUENCER diff; the applier
    /// never invents one.
    pub fn next_sequencer_id(&self) -> SequencerId {
        self.sequencers
            .iter()
            .map(|s| s.id)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Total number of notes across all tracks
    pub fn note_count(&self) -> usize {
        self.sequencers.iter().map(|s| s.notes.len()).sum()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            time_signature: TimeSignature::four_four(),
            total_measures: 16,
            song_key: SongKey::c_major(),
            snap_resolution: 0.25,
            note_duration: 1.0,
            is_triplet_mode: false,
            is_dotted_mode: false,
            sequencers: Vec::new(),
        }
    }
}
