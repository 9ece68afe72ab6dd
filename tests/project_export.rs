//! Integration tests for song export/import
//!
//! A session's snapshot is written to disk and read back into a fresh
//! session. History never travels with the file.

use pianoroll_daw::diff::factory::*;
use pianoroll_daw::project::{
    ProjectError, SongFile, export_json, import_json, load_song, save_song,
};
use pianoroll_daw::{AppState, EngineConfig, LiveRuntime, Note, Session, TimeSignature};
use tempfile::TempDir;

const PIANO: &str = "sf2/fluidr3-gm/acoustic_grand_piano";

fn edited_session() -> Session<LiveRuntime> {
    let config = EngineConfig::default();
    let (runtime, _rx) = LiveRuntime::from_config(&config);
    let mut session = Session::new(config.initial_state(), runtime, &config);

    session.record_diff(
        create_create_sequencer_diff(1, PIANO),
        create_reverse_create_sequencer_diff(1),
    );
    let melody = vec![
        Note::new("E5", 0.0, 0.5),
        Note::new("D#5", 0.5, 0.5).with_velocity(80),
        Note::new("E5", 1.0, 1.5),
    ];
    session.record_diff(
        create_place_notes_diff(1, melody.clone()),
        create_reverse_place_notes_diff(1, melody),
    );
    session.record_diff(
        create_set_time_signature_diff(TimeSignature::three_four()),
        create_reverse_set_time_signature_diff(TimeSignature::four_four()),
    );
    session.record_diff(create_set_pan_diff(1, 0.25), create_reverse_set_pan_diff(1, 0.0));
    session
}

#[test]
fn test_save_and_load_into_new_session() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("songs").join("fur_elise.song.json");

    let session = edited_session();
    let file = SongFile::new("Für Elise", (*session.app_state()).clone());
    save_song(&file, &path).unwrap();
    assert!(path.exists());

    let loaded = load_song(&path).unwrap();
    assert_eq!(loaded.metadata.name, "Für Elise");
    assert_eq!(loaded.metadata.created, file.metadata.created);
    assert_eq!(loaded.state, *session.app_state());

    let config = EngineConfig::default();
    let (runtime, _rx) = LiveRuntime::from_config(&config);
    let mut fresh = Session::new(AppState::default(), runtime, &config);
    fresh.load(loaded.state);

    assert_eq!(fresh.current_time_signature(), TimeSignature::three_four());
    assert_eq!(fresh.app_state().note_count(), 3);
    assert!(!fresh.history().can_undo());
    assert!(fresh.runtime().controllers.contains(1));
}

#[test]
fn test_export_reads_live_snapshot_only() {
    let mut session = edited_session();
    session.undo(); // pan back to centre

    let json = export_json("Draft", &session.app_state()).unwrap();
    let file = import_json(&json).unwrap();
    assert_eq!(file.state.sequencer(1).unwrap().pan, 0.0);
    assert!(!json.contains("CHANGE_TEMPO"));
    assert!(!json.contains("SET_PAN"));
}

#[test]
fn test_load_rejects_invalid_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.song.json");

    let state = AppState {
        total_measures: 0,
        ..AppState::default()
    };
    save_song(&SongFile::new("Broken", state), &path).unwrap();

    let result = load_song(&path);
    assert!(matches!(result, Err(ProjectError::InvalidStructure(_))));
}

#[test]
fn test_velocity_defaults_when_missing() {
    let json = r#"{
        "metadata": {
            "name": "Legacy",
            "version": { "major": 1, "minor": 0 },
            "created": "2024-03-01T10:00:00+00:00",
            "modified": "2024-03-01T10:00:00+00:00"
        },
        "state": {
            "tempo": 100.0,
            "timeSignature": { "beatsPerBar": 4, "beatUnit": 4 },
            "totalMeasures": 8,
            "songKey": "Gm",
            "snapResolution": 0.25,
            "noteDuration": 1.0,
            "isTripletMode": false,
            "isDottedMode": false,
            "sequencers": [{
                "id": 1,
                "instrument": "sf2/fluidr3-gm/acoustic_grand_piano",
                "notes": [{ "pitch": "G4", "start": 0.0, "duration": 1.0 }],
                "volume": 0.8,
                "pan": 0.0,
                "collapsed": false
            }]
        }
    }"#;

    let file = import_json(json).unwrap();
    assert_eq!(file.state.sequencers[0].notes[0].velocity, 100);
    assert_eq!(file.state.song_key.to_string(), "Gm");
}
