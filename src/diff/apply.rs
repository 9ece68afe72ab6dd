// Diff applier registry
//
// apply_diff is total over the vocabulary: it never panics and never returns
// an error. Every applier copies the snapshot before touching it, so the
// input Arc is left exactly as it was.
//
// Policies:
// - target sequencer or every targeted note missing: return the input Arc
//   itself (Arc::ptr_eq holds) and leave the runtime alone
// - reserved or unrecognized kind: return an unmodified copy
// - runtime sync failure: log a warning, keep the new snapshot

use crate::diff::{Diff, DiffKind, ResizeTarget};
use crate::runtime::{RuntimeSyncContext, SideEffect, SyncError};
use crate::state::{AppState, Note, SequencerId, SequencerState};
use crate::state::{DEFAULT_TRACK_PAN, DEFAULT_TRACK_VOLUME};
use std::sync::Arc;

/// Apply one diff to a snapshot and return the next snapshot
pub fn apply_diff(
    state: &Arc<AppState>,
    diff: &Diff,
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    log::trace!("Applying {}", diff.kind());

    match diff {
        Diff::ChangeTempo { bpm } => with_copy(state, |s| s.tempo = *bpm),
        Diff::SetTotalMeasures { total_measures } => {
            with_copy(state, |s| s.total_measures = *total_measures)
        }
        Diff::SetTimeSignature { time_signature } => {
            with_copy(state, |s| s.time_signature = *time_signature)
        }
        Diff::ChangeSnapResolution { resolution } => {
            with_copy(state, |s| s.snap_resolution = *resolution)
        }
        Diff::ChangeNoteDuration { duration } => {
            with_copy(state, |s| s.note_duration = *duration)
        }
        Diff::ChangeSongKey { song_key } => with_copy(state, |s| s.song_key = *song_key),
        Diff::SetNoteModifierMode { triplet, dotted } => with_copy(state, |s| {
            s.is_triplet_mode = *triplet;
            s.is_dotted_mode = *dotted;
        }),

        Diff::PlaceNotes {
            sequencer_id,
            notes,
        }
        | Diff::PasteNotes {
            sequencer_id,
            notes,
        } => apply_add_notes(state, diff.kind(), *sequencer_id, notes, runtime),

        Diff::DeleteNotes {
            sequencer_id,
            notes,
        }
        | Diff::CutNotes {
            sequencer_id,
            notes,
        } => apply_remove_notes(state, diff.kind(), *sequencer_id, notes, runtime),

        Diff::MoveNotes {
            sequencer_id,
            from,
            to,
        } => apply_move_notes(state, *sequencer_id, from, to, runtime),

        Diff::ResizeNotes {
            sequencer_id,
            resizes,
        } => apply_resize_notes(state, *sequencer_id, resizes, runtime),

        Diff::SetNoteVelocity {
            sequencer_id,
            notes,
        } => apply_note_velocity(state, *sequencer_id, notes, runtime),

        Diff::CreateSequencer {
            sequencer_id,
            instrument,
            notes,
            volume,
            pan,
            collapsed,
            position,
        } => {
            let sequencer = SequencerState {
                id: *sequencer_id,
                instrument: instrument.clone(),
                notes: notes.clone(),
                volume: volume.unwrap_or(DEFAULT_TRACK_VOLUME),
                pan: pan.unwrap_or(DEFAULT_TRACK_PAN),
                collapsed: collapsed.unwrap_or(false),
            };
            apply_create_sequencer(state, sequencer, *position, runtime)
        }

        Diff::DeleteSequencer { sequencer_id } => {
            apply_delete_sequencer(state, *sequencer_id, runtime)
        }

        Diff::SetInstrument {
            sequencer_id,
            instrument,
        } => {
            let next = update_sequencer(state, diff.kind(), *sequencer_id, |seq| {
                seq.instrument = instrument.clone();
                true
            });
            if let Some(next) = &next {
                refresh(runtime, next, *sequencer_id);
                report(
                    DiffKind::SetInstrument,
                    runtime.dispatch(SideEffect::LoadInstrument {
                        sequencer_id: *sequencer_id,
                        instrument: instrument.clone(),
                    }),
                );
            }
            next.unwrap_or_else(|| Arc::clone(state))
        }

        Diff::SetVolume {
            sequencer_id,
            volume,
        } => {
            let next = update_sequencer(state, diff.kind(), *sequencer_id, |seq| {
                seq.volume = *volume;
                true
            });
            if let Some(next) = &next {
                refresh(runtime, next, *sequencer_id);
                report(
                    DiffKind::SetVolume,
                    runtime.dispatch(SideEffect::SetVolume {
                        sequencer_id: *sequencer_id,
                        volume: *volume,
                    }),
                );
            }
            next.unwrap_or_else(|| Arc::clone(state))
        }

        Diff::SetPan { sequencer_id, pan } => {
            let next = update_sequencer(state, diff.kind(), *sequencer_id, |seq| {
                seq.pan = *pan;
                true
            });
            if let Some(next) = &next {
                refresh(runtime, next, *sequencer_id);
                report(
                    DiffKind::SetPan,
                    runtime.dispatch(SideEffect::SetPan {
                        sequencer_id: *sequencer_id,
                        pan: *pan,
                    }),
                );
            }
            next.unwrap_or_else(|| Arc::clone(state))
        }

        Diff::SetSequencerCollapsed {
            sequencer_id,
            collapsed,
        } => {
            let next = update_sequencer(state, diff.kind(), *sequencer_id, |seq| {
                seq.collapsed = *collapsed;
                true
            });
            if let Some(next) = &next {
                refresh(runtime, next, *sequencer_id);
            }
            next.unwrap_or_else(|| Arc::clone(state))
        }

        Diff::Checkpoint { label } => {
            log::debug!("Checkpoint: {}", label);
            unmodified_copy(state)
        }

        // Reserved kinds and unknown tags go through unchanged
        Diff::SetLoopRegion { .. } | Diff::QuantizeNotes { .. } | Diff::Unrecognized => {
            log::debug!("{} has no applier, snapshot left unchanged", diff.kind());
            unmodified_copy(state)
        }
    }
}

/// Copy the snapshot, change the copy, share it
fn with_copy(state: &Arc<AppState>, edit: impl FnOnce(&mut AppState)) -> Arc<AppState> {
    let mut next = AppState::clone(state);
    edit(&mut next);
    Arc::new(next)
}

fn unmodified_copy(state: &Arc<AppState>) -> Arc<AppState> {
    Arc::new(AppState::clone(state))
}

/// Copy-on-write edit of one sequencer
///
/// `edit` reports whether it touched anything. None when the sequencer is
/// gone or the edit found nothing to change.
fn update_sequencer(
    state: &Arc<AppState>,
    kind: DiffKind,
    id: SequencerId,
    edit: impl FnOnce(&mut SequencerState) -> bool,
) -> Option<Arc<AppState>> {
    if state.sequencer(id).is_none() {
        log::debug!("{} targets missing sequencer {}, ignored", kind, id);
        return None;
    }

    let mut next = AppState::clone(state);
    if !edit(next.sequencer_mut(id)?) {
        log::debug!("{} matched no notes in sequencer {}, ignored", kind, id);
        return None;
    }
    Some(Arc::new(next))
}

fn report<T>(kind: DiffKind, result: Result<T, SyncError>) {
    if let Err(err) = result {
        log::warn!("{}: runtime sync failed: {}", kind, err);
    }
}

/// Bring the live controller of `id` in line with the new snapshot
fn refresh(runtime: &mut dyn RuntimeSyncContext, state: &AppState, id: SequencerId) {
    if let Some(sequencer) = state.sequencer(id) {
        if let Err(err) = runtime.refresh_controller(sequencer) {
            // Headless sessions have no controllers; not worth a warning
            log::debug!("Controller refresh skipped: {}", err);
        }
    }
}

/// Match each request to a distinct note, in list order
///
/// Notes have no ids, so two identical tuples are told apart only by
/// position: the first request takes the first match, the second request the
/// next unclaimed one, and so on.
fn claim_notes<T>(
    notes: &[Note],
    requests: &[T],
    is_match: impl Fn(&Note, &T) -> bool,
) -> Vec<Option<usize>> {
    let mut claimed = vec![false; notes.len()];
    requests
        .iter()
        .map(|request| {
            let index = notes
                .iter()
                .enumerate()
                .position(|(i, note)| !claimed[i] && is_match(note, request))?;
            claimed[index] = true;
            Some(index)
        })
        .collect()
}

fn apply_add_notes(
    state: &Arc<AppState>,
    kind: DiffKind,
    id: SequencerId,
    notes: &[Note],
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    let Some(next) = update_sequencer(state, kind, id, |seq| {
        seq.notes.extend_from_slice(notes);
        !notes.is_empty()
    }) else {
        return Arc::clone(state);
    };

    let target = next.sequencer(id).and_then(SequencerState::last_note_end);
    runtime.set_autocomplete_target(target);
    refresh(runtime, &next, id);
    next
}

fn apply_remove_notes(
    state: &Arc<AppState>,
    kind: DiffKind,
    id: SequencerId,
    notes: &[Note],
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    // Every tuple match goes, duplicates included
    let Some(next) = update_sequencer(state, kind, id, |seq| {
        let before = seq.notes.len();
        seq.notes
            .retain(|existing| !notes.iter().any(|gone| existing.same_slot(gone)));
        seq.notes.len() != before
    }) else {
        return Arc::clone(state);
    };

    refresh(runtime, &next, id);
    next
}

fn apply_move_notes(
    state: &Arc<AppState>,
    id: SequencerId,
    from: &[Note],
    to: &[Note],
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    if from.len() != to.len() {
        log::warn!(
            "MOVE_NOTES on sequencer {} pairs {} sources with {} targets",
            id,
            from.len(),
            to.len()
        );
    }

    let Some(next) = update_sequencer(state, DiffKind::MoveNotes, id, |seq| {
        // Resolve every source before writing so one move cannot capture
        // a note another move just produced
        let targets = claim_notes(&seq.notes, from, |note, wanted| note.same_slot(wanted));
        let mut moved = false;
        for (index, destination) in targets.into_iter().zip(to) {
            if let Some(index) = index {
                let note = &mut seq.notes[index];
                note.pitch = destination.pitch.clone();
                note.start = destination.start;
                moved = true;
            }
        }
        moved
    }) else {
        return Arc::clone(state);
    };

    runtime.set_last_active_sequencer(Some(id));
    refresh(runtime, &next, id);
    next
}

fn apply_resize_notes(
    state: &Arc<AppState>,
    id: SequencerId,
    resizes: &[ResizeTarget],
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    let Some(next) = update_sequencer(state, DiffKind::ResizeNotes, id, |seq| {
        let targets = claim_notes(&seq.notes, resizes, |note, r| {
            note.same_onset(&r.pitch, r.start)
        });
        let mut resized = false;
        for (index, resize) in targets.into_iter().zip(resizes) {
            if let Some(index) = index {
                seq.notes[index].duration = resize.new_duration;
                resized = true;
            }
        }
        resized
    }) else {
        return Arc::clone(state);
    };

    runtime.set_last_active_sequencer(Some(id));
    refresh(runtime, &next, id);
    next
}

fn apply_note_velocity(
    state: &Arc<AppState>,
    id: SequencerId,
    notes: &[Note],
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    let Some(next) = update_sequencer(state, DiffKind::SetNoteVelocity, id, |seq| {
        let targets = claim_notes(&seq.notes, notes, |note, wanted| note.same_slot(wanted));
        let mut found = false;
        for (index, wanted) in targets.into_iter().zip(notes) {
            if let Some(index) = index {
                seq.notes[index].velocity = wanted.velocity;
                found = true;
            }
        }
        found
    }) else {
        return Arc::clone(state);
    };

    runtime.set_last_active_sequencer(Some(id));
    refresh(runtime, &next, id);
    next
}

fn apply_create_sequencer(
    state: &Arc<AppState>,
    sequencer: SequencerState,
    position: Option<usize>,
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    let id = sequencer.id;
    if state.sequencer(id).is_some() {
        log::warn!("CREATE_SEQUENCER: sequencer {} already exists, ignored", id);
        return Arc::clone(state);
    }

    let next = with_copy(state, |s| match position {
        Some(index) => {
            let index = index.min(s.sequencers.len());
            s.sequencers.insert(index, sequencer);
        }
        None => s.sequencers.push(sequencer),
    });

    // Redo of a create must not mount a second controller
    if let Some(created) = next.sequencer(id) {
        match runtime.ensure_controller(created) {
            Ok(true) => {}
            Ok(false) => refresh(runtime, &next, id),
            Err(err) => log::warn!("CREATE_SEQUENCER: runtime sync failed: {}", err),
        }
    }
    next
}

fn apply_delete_sequencer(
    state: &Arc<AppState>,
    id: SequencerId,
    runtime: &mut dyn RuntimeSyncContext,
) -> Arc<AppState> {
    let Some(index) = state.sequencer_index(id) else {
        log::debug!("DELETE_SEQUENCER targets missing sequencer {}, ignored", id);
        return Arc::clone(state);
    };

    let next = with_copy(state, |s| {
        s.sequencers.remove(index);
    });

    if !runtime.destroy_controller(id) {
        log::debug!("DELETE_SEQUENCER: no live controller for sequencer {}", id);
    }
    report(
        DiffKind::DeleteSequencer,
        runtime.dispatch(SideEffect::ReleaseTrack { sequencer_id: id }),
    );
    if runtime.last_active_sequencer() == Some(id) {
        runtime.set_last_active_sequencer(None);
    }
    runtime.clear_preview();
    next
}
