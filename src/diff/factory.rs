// Diff factories
//
// UI handlers build diffs only through these pairs: create_X_diff for the
// change itself and create_reverse_X_diff for its inverse, given the values
// captured before the change. Keeping both halves here is what keeps
// forward and reverse shaped alike.

use crate::diff::{Diff, NoteResize, ResizeTarget};
use crate::state::{Note, SequencerId, SequencerState, SongKey, TimeSignature};

pub fn create_change_tempo_diff(bpm: f64) -> Diff {
    Diff::ChangeTempo { bpm }
}

/// `old_bpm` is the tempo before the change
pub fn create_reverse_change_tempo_diff(old_bpm: f64) -> Diff {
    Diff::ChangeTempo { bpm: old_bpm }
}

pub fn create_set_total_measures_diff(total_measures: u32) -> Diff {
    Diff::SetTotalMeasures { total_measures }
}

pub fn create_reverse_set_total_measures_diff(old_total_measures: u32) -> Diff {
    Diff::SetTotalMeasures {
        total_measures: old_total_measures,
    }
}

pub fn create_set_time_signature_diff(time_signature: TimeSignature) -> Diff {
    Diff::SetTimeSignature { time_signature }
}

pub fn create_reverse_set_time_signature_diff(old_time_signature: TimeSignature) -> Diff {
    Diff::SetTimeSignature {
        time_signature: old_time_signature,
    }
}

pub fn create_change_snap_resolution_diff(resolution: f64) -> Diff {
    Diff::ChangeSnapResolution { resolution }
}

pub fn create_reverse_change_snap_resolution_diff(old_resolution: f64) -> Diff {
    Diff::ChangeSnapResolution {
        resolution: old_resolution,
    }
}

pub fn create_change_note_duration_diff(duration: f64) -> Diff {
    Diff::ChangeNoteDuration { duration }
}

pub fn create_reverse_change_note_duration_diff(old_duration: f64) -> Diff {
    Diff::ChangeNoteDuration {
        duration: old_duration,
    }
}

pub fn create_change_song_key_diff(song_key: SongKey) -> Diff {
    Diff::ChangeSongKey { song_key }
}

pub fn create_reverse_change_song_key_diff(old_song_key: SongKey) -> Diff {
    Diff::ChangeSongKey {
        song_key: old_song_key,
    }
}

pub fn create_set_note_modifier_mode_diff(triplet: bool, dotted: bool) -> Diff {
    Diff::SetNoteModifierMode { triplet, dotted }
}

pub fn create_reverse_set_note_modifier_mode_diff(old_triplet: bool, old_dotted: bool) -> Diff {
    Diff::SetNoteModifierMode {
        triplet: old_triplet,
        dotted: old_dotted,
    }
}

pub fn create_place_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::PlaceNotes {
        sequencer_id,
        notes,
    }
}

/// Undo of a placement deletes the same notes
pub fn create_reverse_place_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::DeleteNotes {
        sequencer_id,
        notes,
    }
}

pub fn create_paste_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::PasteNotes {
        sequencer_id,
        notes,
    }
}

pub fn create_reverse_paste_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::DeleteNotes {
        sequencer_id,
        notes,
    }
}

pub fn create_delete_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::DeleteNotes {
        sequencer_id,
        notes,
    }
}

/// Undo of a deletion places the same notes back
pub fn create_reverse_delete_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::PlaceNotes {
        sequencer_id,
        notes,
    }
}

pub fn create_cut_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::CutNotes {
        sequencer_id,
        notes,
    }
}

pub fn create_reverse_cut_notes_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::PlaceNotes {
        sequencer_id,
        notes,
    }
}

pub fn create_move_notes_diff(sequencer_id: SequencerId, from: Vec<Note>, to: Vec<Note>) -> Diff {
    Diff::MoveNotes {
        sequencer_id,
        from,
        to,
    }
}

/// Takes the same arguments as the forward factory and swaps them
pub fn create_reverse_move_notes_diff(
    sequencer_id: SequencerId,
    from: Vec<Note>,
    to: Vec<Note>,
) -> Diff {
    Diff::MoveNotes {
        sequencer_id,
        from: to,
        to: from,
    }
}

pub fn create_resize_notes_diff(sequencer_id: SequencerId, resizes: &[NoteResize]) -> Diff {
    Diff::ResizeNotes {
        sequencer_id,
        resizes: resizes
            .iter()
            .map(|r| ResizeTarget {
                pitch: r.pitch.clone(),
                start: r.start,
                new_duration: r.new_duration,
            })
            .collect(),
    }
}

/// Same records as the forward factory; each note goes back to `old_duration`
pub fn create_reverse_resize_notes_diff(sequencer_id: SequencerId, resizes: &[NoteResize]) -> Diff {
    Diff::ResizeNotes {
        sequencer_id,
        resizes: resizes
            .iter()
            .map(|r| ResizeTarget {
                pitch: r.pitch.clone(),
                start: r.start,
                new_duration: r.old_duration,
            })
            .collect(),
    }
}

/// `notes` carry the new velocities
pub fn create_set_note_velocity_diff(sequencer_id: SequencerId, notes: Vec<Note>) -> Diff {
    Diff::SetNoteVelocity {
        sequencer_id,
        notes,
    }
}

/// `notes` carry the velocities from before the change
pub fn create_reverse_set_note_velocity_diff(
    sequencer_id: SequencerId,
    notes: Vec<Note>,
) -> Diff {
    Diff::SetNoteVelocity {
        sequencer_id,
        notes,
    }
}

/// New empty track with default mix settings, appended at the end
pub fn create_create_sequencer_diff(
    sequencer_id: SequencerId,
    instrument: impl Into<String>,
) -> Diff {
    Diff::CreateSequencer {
        sequencer_id,
        instrument: instrument.into(),
        notes: Vec::new(),
        volume: None,
        pan: None,
        collapsed: None,
        position: None,
    }
}

/// New track carrying every field of `sequencer`, e.g. a duplicated track
pub fn create_create_sequencer_diff_from(sequencer: &SequencerState) -> Diff {
    Diff::CreateSequencer {
        sequencer_id: sequencer.id,
        instrument: sequencer.instrument.clone(),
        notes: sequencer.notes.clone(),
        volume: Some(sequencer.volume),
        pan: Some(sequencer.pan),
        collapsed: Some(sequencer.collapsed),
        position: None,
    }
}

pub fn create_reverse_create_sequencer_diff(sequencer_id: SequencerId) -> Diff {
    Diff::DeleteSequencer { sequencer_id }
}

pub fn create_delete_sequencer_diff(sequencer_id: SequencerId) -> Diff {
    Diff::DeleteSequencer { sequencer_id }
}

/// Rebuilds the deleted track from its state captured before deletion
///
/// `position` is the track's index in the list at that time.
pub fn create_reverse_delete_sequencer_diff(
    deleted: &SequencerState,
    position: usize,
) -> Diff {
    Diff::CreateSequencer {
        sequencer_id: deleted.id,
        instrument: deleted.instrument.clone(),
        notes: deleted.notes.clone(),
        volume: Some(deleted.volume),
        pan: Some(deleted.pan),
        collapsed: Some(deleted.collapsed),
        position: Some(position),
    }
}

pub fn create_set_instrument_diff(
    sequencer_id: SequencerId,
    instrument: impl Into<String>,
) -> Diff {
    Diff::SetInstrument {
        sequencer_id,
        instrument: instrument.into(),
    }
}

pub fn create_reverse_set_instrument_diff(
    sequencer_id: SequencerId,
    old_instrument: impl Into<String>,
) -> Diff {
    Diff::SetInstrument {
        sequencer_id,
        instrument: old_instrument.into(),
    }
}

pub fn create_set_volume_diff(sequencer_id: SequencerId, volume: f64) -> Diff {
    Diff::SetVolume {
        sequencer_id,
        volume,
    }
}

pub fn create_reverse_set_volume_diff(sequencer_id: SequencerId, old_volume: f64) -> Diff {
    Diff::SetVolume {
        sequencer_id,
        volume: old_volume,
    }
}

pub fn create_set_pan_diff(sequencer_id: SequencerId, pan: f64) -> Diff {
    Diff::SetPan { sequencer_id, pan }
}

pub fn create_reverse_set_pan_diff(sequencer_id: SequencerId, old_pan: f64) -> Diff {
    Diff::SetPan {
        sequencer_id,
        pan: old_pan,
    }
}

pub fn create_set_sequencer_collapsed_diff(sequencer_id: SequencerId, collapsed: bool) -> Diff {
    Diff::SetSequencerCollapsed {
        sequencer_id,
        collapsed,
    }
}

pub fn create_reverse_set_sequencer_collapsed_diff(
    sequencer_id: SequencerId,
    old_collapsed: bool,
) -> Diff {
    Diff::SetSequencerCollapsed {
        sequencer_id,
        collapsed: old_collapsed,
    }
}

pub fn create_checkpoint_diff(label: impl Into<String>) -> Diff {
    Diff::Checkpoint {
        label: label.into(),
    }
}

pub fn create_reverse_checkpoint_diff(label: impl Into<String>) -> Diff {
    Diff::Checkpoint {
        label: label.into(),
    }
}
