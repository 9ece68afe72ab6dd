// Song persistence
// Snapshots are exported as a single JSON document

pub mod manager;
pub mod types;

pub use manager::{ProjectError, export_json, import_json, load_song, save_song};
pub use types::{SongFile, SongFormatVersion, SongMetadata};

use crate::state::AppState;
use crate::state::timing::is_valid_bpm;
use std::collections::HashSet;

/// Reject snapshots the engine cannot work with
pub fn validate_song_structure(state: &AppState) -> Result<(), ProjectError> {
    if !is_valid_bpm(state.tempo) {
        return Err(ProjectError::InvalidStructure(format!(
            "Tempo {} BPM is out of range",
            state.tempo
        )));
    }

    if !state.time_signature.is_valid() {
        return Err(ProjectError::InvalidStructure(format!(
            "Invalid time signature {}",
            state.time_signature
        )));
    }

    if state.total_measures == 0 {
        return Err(ProjectError::InvalidStructure(
            "Song must have at least one measure".to_string(),
        ));
    }

    let mut ids = HashSet::new();
    for seq in &state.sequencers {
        if !ids.insert(seq.id) {
            return Err(ProjectError::InvalidStructure(format!(
                "Duplicate sequencer ID: {}",
                seq.id
            )));
        }

        if !(0.0..=1.0).contains(&seq.volume) {
            return Err(ProjectError::InvalidStructure(format!(
                "Sequencer {} volume must be between 0.0 and 1.0",
                seq.id
            )));
        }

        if !(-1.0..=1.0).contains(&seq.pan) {
            return Err(ProjectError::InvalidStructure(format!(
                "Sequencer {} pan must be between -1.0 and 1.0",
                seq.id
            )));
        }

        for note in &seq.notes {
            if note.duration <= 0.0 || note.start < 0.0 {
                return Err(ProjectError::InvalidStructure(format!(
                    "Note {} at beat {} in sequencer {} has invalid timing",
                    note.pitch, note.start, seq.id
                )));
            }

            if note.midi_number().is_none() {
                return Err(ProjectError::InvalidStructure(format!(
                    "Unknown pitch '{}' in sequencer {}",
                    note.pitch, seq.id
                )));
            }

            if note.velocity > 127 {
                return Err(ProjectError::InvalidStructure(format!(
                    "Note velocity {} exceeds MIDI range (0-127) in sequencer {}",
                    note.velocity, seq.id
                )));
            }
        }
    }

    Ok(())
}
