// Diff vocabulary
//
// Every change to the song is described by a Diff: plain, serializable data
// carrying exactly what its applier needs. Diffs are built in forward/reverse
// pairs by the factories in `factory`, and only ever applied by
// `apply::apply_diff` from the history.
//
// Forward and reverse share appliers: the reverse of a tempo change is
// another tempo change, the reverse of CREATE_SEQUENCER is DELETE_SEQUENCER,
// and so on. Runtime side effects stay symmetric because of this.

pub mod apply;
pub mod factory;

pub use apply::apply_diff;
pub use factory::*;

use crate::state::{Note, SequencerId, SongKey, TimeSignature};
use serde::{Deserialize, Serialize};
use std::fmt;

/// New duration for the note starting at (pitch, start)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeTarget {
    pub pitch: String,
    pub start: f64,
    pub new_duration: f64,
}

/// One resize gesture as seen by the UI: both durations are known up front
///
/// The factories turn a slice of these into forward and reverse
/// RESIZE_NOTES diffs with the duration fields swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteResize {
    pub pitch: String,
    pub start: f64,
    pub old_duration: f64,
    pub new_duration: f64,
}

/// A single, invertible description of a state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Diff {
    ChangeTempo {
        bpm: f64,
    },
    SetTotalMeasures {
        total_measures: u32,
    },
    SetTimeSignature {
        time_signature: TimeSignature,
    },
    ChangeSnapResolution {
        resolution: f64,
    },
    ChangeNoteDuration {
        duration: f64,
    },
    ChangeSongKey {
        song_key: SongKey,
    },
    SetNoteModifierMode {
        triplet: bool,
        dotted: bool,
    },
    PlaceNotes {
        sequencer_id: SequencerId,
        notes: Vec<Note>,
    },
    PasteNotes {
        sequencer_id: SequencerId,
        notes: Vec<Note>,
    },
    DeleteNotes {
        sequencer_id: SequencerId,
        notes: Vec<Note>,
    },
    CutNotes {
        sequencer_id: SequencerId,
        notes: Vec<Note>,
    },
    MoveNotes {
        sequencer_id: SequencerId,
        from: Vec<Note>,
        to: Vec<Note>,
    },
    ResizeNotes {
        sequencer_id: SequencerId,
        resizes: Vec<ResizeTarget>,
    },
    SetNoteVelocity {
        sequencer_id: SequencerId,
        notes: Vec<Note>,
    },
    CreateSequencer {
        sequencer_id: SequencerId,
        instrument: String,
        #[serde(default)]
        notes: Vec<Note>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pan: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        collapsed: Option<bool>,
        /// Index to re-insert at; None appends
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },
    DeleteSequencer {
        sequencer_id: SequencerId,
    },
    SetInstrument {
        sequencer_id: SequencerId,
        instrument: String,
    },
    SetVolume {
        sequencer_id: SequencerId,
        volume: f64,
    },
    SetPan {
        sequencer_id: SequencerId,
        pan: f64,
    },
    SetSequencerCollapsed {
        sequencer_id: SequencerId,
        collapsed: bool,
    },
    /// History marker; applies as identity
    Checkpoint {
        label: String,
    },
    /// Reserved: the snapshot has no loop region yet
    SetLoopRegion {
        start: f64,
        end: f64,
    },
    /// Reserved: quantization is still done by the UI before PLACE_NOTES
    QuantizeNotes {
        sequencer_id: SequencerId,
        grid: f64,
    },
    /// Any serialized diff whose tag is not part of the vocabulary
    #[serde(other)]
    Unrecognized,
}

/// Tag of a diff, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    ChangeTempo,
    SetTotalMeasures,
    SetTimeSignature,
    ChangeSnapResolution,
    ChangeNoteDuration,
    ChangeSongKey,
    SetNoteModifierMode,
    PlaceNotes,
    PasteNotes,
    DeleteNotes,
    CutNotes,
    MoveNotes,
    ResizeNotes,
    SetNoteVelocity,
    CreateSequencer,
    DeleteSequencer,
    SetInstrument,
    SetVolume,
    SetPan,
    SetSequencerCollapsed,
    Checkpoint,
    SetLoopRegion,
    QuantizeNotes,
    Unrecognized,
}

impl DiffKind {
    /// Wire tag, e.g. "CHANGE_TEMPO"
    pub fn as_str(self) -> &'static str {
        match self {
            DiffKind::ChangeTempo => "CHANGE_TEMPO",
            DiffKind::SetTotalMeasures => "SET_TOTAL_MEASURES",
            DiffKind::SetTimeSignature => "SET_TIME_SIGNATURE",
            DiffKind::ChangeSnapResolution => "CHANGE_SNAP_RESOLUTION",
            DiffKind::ChangeNoteDuration => "CHANGE_NOTE_DURATION",
            DiffKind::ChangeSongKey => "CHANGE_SONG_KEY",
            DiffKind::SetNoteModifierMode => "SET_NOTE_MODIFIER_MODE",
            DiffKind::PlaceNotes => "PLACE_NOTES",
            DiffKind::PasteNotes => "PASTE_NOTES",
            DiffKind::DeleteNotes => "DELETE_NOTES",
            DiffKind::CutNotes => "CUT_NOTES",
            DiffKind::MoveNotes => "MOVE_NOTES",
            DiffKind::ResizeNotes => "RESIZE_NOTES",
            DiffKind::SetNoteVelocity => "SET_NOTE_VELOCITY",
            DiffKind::CreateSequencer => "CREATE_SEQUENCER",
            DiffKind::DeleteSequencer => "DELETE_SEQUENCER",
            DiffKind::SetInstrument => "SET_INSTRUMENT",
            DiffKind::SetVolume => "SET_VOLUME",
            DiffKind::SetPan => "SET_PAN",
            DiffKind::SetSequencerCollapsed => "SET_SEQUENCER_COLLAPSED",
            DiffKind::Checkpoint => "CHECKPOINT",
            DiffKind::SetLoopRegion => "SET_LOOP_REGION",
            DiffKind::QuantizeNotes => "QUANTIZE_NOTES",
            DiffKind::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Whether applying this kind only touches the snapshot
    ///
    /// Track-scoped kinds also drive the runtime layer (controller mirrors,
    /// the last-active pointer, previews, audio side effects). For the
    /// snapshot-only kinds `apply(reverse, apply(forward, s)) == s` holds
    /// with no observable effect outside the snapshot.
    pub fn is_snapshot_only(self) -> bool {
        matches!(
            self,
            DiffKind::ChangeTempo
                | DiffKind::SetTotalMeasures
                | DiffKind::SetTimeSignature
                | DiffKind::ChangeSnapResolution
                | DiffKind::ChangeNoteDuration
                | DiffKind::ChangeSongKey
                | DiffKind::SetNoteModifierMode
                | DiffKind::Checkpoint
                | DiffKind::SetLoopRegion
                | DiffKind::QuantizeNotes
                | DiffKind::Unrecognized
        )
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Diff {
    pub fn kind(&self) -> DiffKind {
        match self {
            Diff::ChangeTempo { .. } => DiffKind::ChangeTempo,
            Diff::SetTotalMeasures { .. } => DiffKind::SetTotalMeasures,
            Diff::SetTimeSignature { .. } => DiffKind::SetTimeSignature,
            Diff::ChangeSnapResolution { .. } => DiffKind::ChangeSnapResolution,
            Diff::ChangeNoteDuration { .. } => DiffKind::ChangeNoteDuration,
            Diff::ChangeSongKey { .. } => DiffKind::ChangeSongKey,
            Diff::SetNoteModifierMode { .. } => DiffKind::SetNoteModifierMode,
            Diff::PlaceNotes { .. } => DiffKind::PlaceNotes,
            Diff::PasteNotes { .. } => DiffKind::PasteNotes,
            Diff::DeleteNotes { .. } => DiffKind::DeleteNotes,
            Diff::CutNotes { .. } => DiffKind::CutNotes,
            Diff::MoveNotes { .. } => DiffKind::MoveNotes,
            Diff::ResizeNotes { .. } => DiffKind::ResizeNotes,
            Diff::SetNoteVelocity { .. } => DiffKind::SetNoteVelocity,
            Diff::CreateSequencer { .. } => DiffKind::CreateSequencer,
            Diff::DeleteSequencer { .. } => DiffKind::DeleteSequencer,
            Diff::SetInstrument { .. } => DiffKind::SetInstrument,
            Diff::SetVolume { .. } => DiffKind::SetVolume,
            Diff::SetPan { .. } => DiffKind::SetPan,
            Diff::SetSequencerCollapsed { .. } => DiffKind::SetSequencerCollapsed,
            Diff::Checkpoint { .. } => DiffKind::Checkpoint,
            Diff::SetLoopRegion { .. } => DiffKind::SetLoopRegion,
            Diff::QuantizeNotes { .. } => DiffKind::QuantizeNotes,
            Diff::Unrecognized => DiffKind::Unrecognized,
        }
    }

    /// Sequencer this diff targets, for track-scoped kinds
    pub fn sequencer_id(&self) -> Option<SequencerId> {
        match self {
            Diff::PlaceNotes { sequencer_id, .. }
            | Diff::PasteNotes { sequencer_id, .. }
            | Diff::DeleteNotes { sequencer_id, .. }
            | Diff::CutNotes { sequencer_id, .. }
            | Diff::MoveNotes { sequencer_id, .. }
            | Diff::ResizeNotes { sequencer_id, .. }
            | Diff::SetNoteVelocity { sequencer_id, .. }
            | Diff::CreateSequencer { sequencer_id, .. }
            | Diff::DeleteSequencer { sequencer_id }
            | Diff::SetInstrument { sequencer_id, .. }
            | Diff::SetVolume { sequencer_id, .. }
            | Diff::SetPan { sequencer_id, .. }
            | Diff::SetSequencerCollapsed { sequencer_id, .. }
            | Diff::QuantizeNotes { sequencer_id, .. } => Some(*sequencer_id),
            _ => None,
        }
    }

    /// Human-readable label for undo/redo menus
    pub fn description(&self) -> String {
        fn plural(n: usize) -> &'static str {
            if n == 1 { "" } else { "s" }
        }

        match self {
            Diff::ChangeTempo { bpm } => format!("Change Tempo to {:.0} BPM", bpm),
            Diff::SetTotalMeasures { total_measures } => {
                format!("Set Length to {} Measures", total_measures)
            }
            Diff::SetTimeSignature { time_signature } => {
                format!("Set Time Signature to {}", time_signature)
            }
            Diff::ChangeSnapResolution { resolution } => {
                format!("Set Snap to {} Beats", resolution)
            }
            Diff::ChangeNoteDuration { duration } => {
                format!("Set Note Duration to {} Beats", duration)
            }
            Diff::ChangeSongKey { song_key } => format!("Change Key to {}", song_key),
            Diff::SetNoteModifierMode { triplet, dotted } => match (triplet, dotted) {
                (true, _) => "Enable Triplet Mode".to_string(),
                (false, true) => "Enable Dotted Mode".to_string(),
                (false, false) => "Clear Note Modifiers".to_string(),
            },
            Diff::PlaceNotes { notes, .. } => {
                format!("Place {} Note{}", notes.len(), plural(notes.len()))
            }
            Diff::PasteNotes { notes, .. } => {
                format!("Paste {} Note{}", notes.len(), plural(notes.len()))
            }
            Diff::DeleteNotes { notes, .. } => {
                format!("Delete {} Note{}", notes.len(), plural(notes.len()))
            }
            Diff::CutNotes { notes, .. } => {
                format!("Cut {} Note{}", notes.len(), plural(notes.len()))
            }
            Diff::MoveNotes { from, .. } => {
                format!("Move {} Note{}", from.len(), plural(from.len()))
            }
            Diff::ResizeNotes { resizes, .. } => {
                format!("Resize {} Note{}", resizes.len(), plural(resizes.len()))
            }
            Diff::SetNoteVelocity { notes, .. } => {
                format!("Set Velocity on {} Note{}", notes.len(), plural(notes.len()))
            }
            Diff::CreateSequencer { instrument, .. } => format!("Add Track ({})", instrument),
            Diff::DeleteSequencer { sequencer_id } => format!("Delete Track {}", sequencer_id),
            Diff::SetInstrument { instrument, .. } => format!("Set Instrument to {}", instrument),
            Diff::SetVolume { volume, .. } => format!("Set Volume to {:.2}", volume),
            Diff::SetPan { pan, .. } => format!("Set Pan to {:.2}", pan),
            Diff::SetSequencerCollapsed { collapsed, .. } => {
                if *collapsed {
                    "Collapse Track".to_string()
                } else {
                    "Expand Track".to_string()
                }
            }
            Diff::Checkpoint { label } => label.clone(),
            Diff::SetLoopRegion { .. } => "Set Loop Region".to_string(),
            Diff::QuantizeNotes { .. } => "Quantize Notes".to_string(),
            Diff::Unrecognized => "Unrecognized Change".to_string(),
        }
    }
}
