//! Randomized reversibility tests
//!
//! Random editing sessions are generated against the live snapshot, each
//! change built with its factory pair. Undoing everything must give back the
//! starting song, redoing everything must give back the final one, and the
//! live controllers must track the snapshot the whole way.

use pianoroll_daw::diff::factory::*;
use pianoroll_daw::runtime::drain_effects;
use pianoroll_daw::state::note::midi_to_pitch;
use pianoroll_daw::{
    AppState, Diff, EngineConfig, LiveRuntime, NoopRuntime, Note, NoteResize, SequencerState,
    Session, SongKey, TimeSignature, apply_diff,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const INSTRUMENTS: [&str; 4] = [
    "sf2/fluidr3-gm/acoustic_grand_piano",
    "sf2/fluidr3-gm/electric_bass_finger",
    "sf2/fluidr3-gm/string_ensemble_1",
    "sf2/fluidr3-gm/flute",
];

/// Notes are matched by value, so restored notes may come back in a
/// different order; compare songs with every note list sorted
fn normalized(state: &AppState) -> AppState {
    let mut state = state.clone();
    for seq in &mut state.sequencers {
        seq.notes.sort_by(|a, b| {
            a.start
                .partial_cmp(&b.start)
                .unwrap()
                .then_with(|| a.pitch.cmp(&b.pitch))
                .then_with(|| a.duration.partial_cmp(&b.duration).unwrap())
                .then_with(|| a.velocity.cmp(&b.velocity))
        });
    }
    state
}

/// A (pitch, start) no note in `taken` occupies
fn free_slot(taken: &[Note], rng: &mut StdRng) -> Option<(String, f64)> {
    for _ in 0..32 {
        let pitch = midi_to_pitch(rng.gen_range(36..84));
        let start = rng.gen_range(0..256) as f64 * 0.25;
        if !taken.iter().any(|n| n.same_onset(&pitch, start)) {
            return Some((pitch, start));
        }
    }
    None
}

fn random_note(taken: &[Note], rng: &mut StdRng) -> Option<Note> {
    let (pitch, start) = free_slot(taken, rng)?;
    let duration = rng.gen_range(1..8) as f64 * 0.25;
    Some(Note::new(pitch, start, duration).with_velocity(rng.gen_range(1..=127)))
}

fn pick<'a, T>(items: &'a [T], rng: &mut StdRng) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.gen_range(0..items.len())])
    }
}

fn random_global_pair(state: &AppState, rng: &mut StdRng) -> (Diff, Diff) {
    match rng.gen_range(0..7) {
        0 => (
            create_change_tempo_diff(rng.gen_range(40..240) as f64),
            create_reverse_change_tempo_diff(state.tempo),
        ),
        1 => (
            create_set_total_measures_diff(rng.gen_range(1..64)),
            create_reverse_set_total_measures_diff(state.total_measures),
        ),
        2 => {
            let signatures = [
                TimeSignature::four_four(),
                TimeSignature::three_four(),
                TimeSignature::six_eight(),
            ];
            (
                create_set_time_signature_diff(signatures[rng.gen_range(0..3)]),
                create_reverse_set_time_signature_diff(state.time_signature),
            )
        }
        3 => (
            create_change_snap_resolution_diff([0.125, 0.25, 0.5, 1.0][rng.gen_range(0..4)]),
            create_reverse_change_snap_resolution_diff(state.snap_resolution),
        ),
        4 => (
            create_change_note_duration_diff([0.25, 0.5, 1.0, 2.0][rng.gen_range(0..4)]),
            create_reverse_change_note_duration_diff(state.note_duration),
        ),
        5 => {
            let keys: Vec<SongKey> = SongKey::all().collect();
            (
                create_change_song_key_diff(keys[rng.gen_range(0..keys.len())]),
                create_reverse_change_song_key_diff(state.song_key),
            )
        }
        _ => (
            create_set_note_modifier_mode_diff(rng.gen_bool(0.5), rng.gen_bool(0.5)),
            create_reverse_set_note_modifier_mode_diff(state.is_triplet_mode, state.is_dotted_mode),
        ),
    }
}

fn random_track_pair(seq: &SequencerState, index: usize, rng: &mut StdRng) -> Option<(Diff, Diff)> {
    let id = seq.id;
    let pair = match rng.gen_range(0..11) {
        0 | 1 => {
            let mut taken = seq.notes.clone();
            let mut placed = Vec::new();
            for _ in 0..rng.gen_range(1..4) {
                let note = random_note(&taken, rng)?;
                taken.push(note.clone());
                placed.push(note);
            }
            if rng.gen_bool(0.5) {
                (
                    create_place_notes_diff(id, placed.clone()),
                    create_reverse_place_notes_diff(id, placed),
                )
            } else {
                (
                    create_paste_notes_diff(id, placed.clone()),
                    create_reverse_paste_notes_diff(id, placed),
                )
            }
        }
        2 => {
            let gone = vec![pick(&seq.notes, rng)?.clone()];
            if rng.gen_bool(0.5) {
                (
                    create_delete_notes_diff(id, gone.clone()),
                    create_reverse_delete_notes_diff(id, gone),
                )
            } else {
                (
                    create_cut_notes_diff(id, gone.clone()),
                    create_reverse_cut_notes_diff(id, gone),
                )
            }
        }
        3 => {
            let note = pick(&seq.notes, rng)?.clone();
            let (pitch, start) = free_slot(&seq.notes, rng)?;
            let moved = Note {
                pitch,
                start,
                ..note.clone()
            };
            (
                create_move_notes_diff(id, vec![note.clone()], vec![moved.clone()]),
                create_reverse_move_notes_diff(id, vec![note], vec![moved]),
            )
        }
        4 => {
            let note = pick(&seq.notes, rng)?;
            let resize = [NoteResize {
                pitch: note.pitch.clone(),
                start: note.start,
                old_duration: note.duration,
                new_duration: rng.gen_range(1..16) as f64 * 0.25,
            }];
            (
                create_resize_notes_diff(id, &resize),
                create_reverse_resize_notes_diff(id, &resize),
            )
        }
        5 => {
            let note = pick(&seq.notes, rng)?.clone();
            let louder = note.clone().with_velocity(rng.gen_range(1..=127));
            (
                create_set_note_velocity_diff(id, vec![louder]),
                create_reverse_set_note_velocity_diff(id, vec![note]),
            )
        }
        6 => (
            create_set_instrument_diff(id, *pick(&INSTRUMENTS, rng)?),
            create_reverse_set_instrument_diff(id, seq.instrument.clone()),
        ),
        7 => (
            create_set_volume_diff(id, rng.gen_range(0..=100) as f64 / 100.0),
            create_reverse_set_volume_diff(id, seq.volume),
        ),
        8 => (
            create_set_pan_diff(id, rng.gen_range(-100..=100) as f64 / 100.0),
            create_reverse_set_pan_diff(id, seq.pan),
        ),
        9 => (
            create_set_sequencer_collapsed_diff(id, !seq.collapsed),
            create_reverse_set_sequencer_collapsed_diff(id, seq.collapsed),
        ),
        _ => (
            create_delete_sequencer_diff(id),
            create_reverse_delete_sequencer_diff(seq, index),
        ),
    };
    Some(pair)
}

/// Build a random change against the current snapshot
fn random_pair(state: &AppState, rng: &mut StdRng) -> (Diff, Diff) {
    let roll = rng.gen_range(0..10);
    if roll == 0 || state.sequencers.is_empty() {
        let id = state.next_sequencer_id();
        let instrument = *pick(&INSTRUMENTS, rng).unwrap();
        return (
            create_create_sequencer_diff(id, instrument),
            create_reverse_create_sequencer_diff(id),
        );
    }
    if roll < 3 {
        return random_global_pair(state, rng);
    }

    let index = rng.gen_range(0..state.sequencers.len());
    random_track_pair(&state.sequencers[index], index, rng)
        .unwrap_or_else(|| random_global_pair(state, rng))
}

fn assert_runtime_in_sync(session: &Session<LiveRuntime>) {
    let state = session.app_state();
    let controllers = &session.runtime().controllers;
    let mut ids: Vec<u32> = state.sequencers.iter().map(|s| s.id).collect();
    ids.sort_unstable();
    assert_eq!(controllers.ids(), ids);
    for seq in &state.sequencers {
        assert!(controllers.get(seq.id).unwrap().matches(seq));
    }
}

#[test]
fn random_sessions_undo_and_redo_completely() {
    let config = EngineConfig {
        max_history: 0,
        ..EngineConfig::default()
    };

    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (runtime, mut effects) = LiveRuntime::from_config(&config);
        let mut session = Session::new(config.initial_state(), runtime, &config);
        let initial = normalized(&session.app_state());

        let steps = rng.gen_range(20..150);
        for _ in 0..steps {
            let (forward, reverse) = random_pair(&session.app_state(), &mut rng);
            session.record_diff(forward, reverse);
            drain_effects(&mut effects);
            assert_runtime_in_sync(&session);
        }
        let last = normalized(&session.app_state());

        while session.undo().is_some() {
            drain_effects(&mut effects);
            assert_runtime_in_sync(&session);
        }
        assert_eq!(normalized(&session.app_state()), initial, "seed {}", seed);

        while session.redo().is_some() {
            drain_effects(&mut effects);
        }
        assert_eq!(normalized(&session.app_state()), last, "seed {}", seed);
        assert_runtime_in_sync(&session);
    }
}

#[test]
fn random_pairs_invert_exactly_on_unique_notes() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut state = Arc::new(AppState::default());

    for _ in 0..500 {
        let (forward, reverse) = random_pair(&state, &mut rng);
        let next = apply_diff(&state, &forward, &mut NoopRuntime);
        let back = apply_diff(&next, &reverse, &mut NoopRuntime);
        assert_eq!(
            normalized(&back),
            normalized(&state),
            "{} did not invert",
            forward.kind()
        );
        state = next;
    }
}

#[test]
fn snapshot_only_kinds_never_touch_runtime() {
    let mut rng = StdRng::seed_from_u64(11);
    let state = Arc::new(AppState::default());

    for _ in 0..100 {
        let (forward, reverse) = random_global_pair(&state, &mut rng);
        assert!(forward.kind().is_snapshot_only());

        // NoopRuntime would hide runtime calls; a live runtime with no
        // container would fail loudly on any controller work
        let config = EngineConfig {
            controller_container: None,
            ..EngineConfig::default()
        };
        let (mut runtime, mut effects) = LiveRuntime::from_config(&config);
        let next = apply_diff(&state, &forward, &mut runtime);
        let back = apply_diff(&next, &reverse, &mut runtime);

        assert_eq!(*back, *state);
        assert!(drain_effects(&mut effects).is_empty());
        assert!(runtime.controllers.is_empty());
        assert_eq!(runtime.last_active, None);
    }
}

#[test]
fn track_diffs_on_missing_sequencer_return_same_snapshot() {
    let mut rng = StdRng::seed_from_u64(3);
    let state = Arc::new(AppState::default());
    let ghost = SequencerState {
        notes: vec![Note::new("C4", 0.0, 1.0)],
        ..SequencerState::new(99, INSTRUMENTS[0])
    };

    for _ in 0..100 {
        let Some((forward, reverse)) = random_track_pair(&ghost, 0, &mut rng) else {
            continue;
        };
        assert!(Arc::ptr_eq(
            &state,
            &apply_diff(&state, &forward, &mut NoopRuntime)
        ));
        // DELETE_SEQUENCER's reverse creates the track; every other reverse
        // is track-scoped and must also be a no-op
        if !matches!(reverse, Diff::CreateSequencer { .. }) {
            assert!(Arc::ptr_eq(
                &state,
                &apply_diff(&state, &reverse, &mut NoopRuntime)
            ));
        }
    }
}
