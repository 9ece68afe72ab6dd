// Quick demonstration of an editing session
// Run with: RUST_LOG=debug cargo run --bin demo_session

use pianoroll_daw::diff::factory::*;
use pianoroll_daw::project::{SongFile, load_song, save_song};
use pianoroll_daw::runtime::drain_effects;
use pianoroll_daw::{EngineConfig, LiveRuntime, Note, NoteResize, Session, SongKey};

const PIANO: &str = "sf2/fluidr3-gm/acoustic_grand_piano";
const BASS: &str = "sf2/fluidr3-gm/electric_bass_finger";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("🎹 Piano Roll - Editing Session Demo");
    println!("====================================");

    let config = EngineConfig::default();
    let (runtime, mut effects) = LiveRuntime::from_config(&config);
    let mut session = Session::new(config.initial_state(), runtime, &config);

    // Add a track and a short phrase
    session.record_diff(
        create_create_sequencer_diff(1, PIANO),
        create_reverse_create_sequencer_diff(1),
    );
    let phrase = vec![
        Note::new("C4", 0.0, 1.0),
        Note::new("E4", 1.0, 1.0),
        Note::new("G4", 2.0, 2.0),
    ];
    session.record_diff(
        create_place_notes_diff(1, phrase.clone()),
        create_reverse_place_notes_diff(1, phrase),
    );

    // Stretch the last note and change key
    let resize = [NoteResize {
        pitch: "G4".to_string(),
        start: 2.0,
        old_duration: 2.0,
        new_duration: 4.0,
    }];
    session.record_diff(
        create_resize_notes_diff(1, &resize),
        create_reverse_resize_notes_diff(1, &resize),
    );
    let old_key = session.current_song_key();
    let new_key: SongKey = "Am".parse()?;
    session.record_diff(
        create_change_song_key_diff(new_key),
        create_reverse_change_song_key_diff(old_key),
    );

    println!("✅ Recorded {} changes", session.history().len());
    println!("   - Key: {}", session.current_song_key());
    println!("   - Notes: {}", session.app_state().note_count());

    // Swap the instrument; the load request goes to the effect queue
    session.record_diff(
        create_set_instrument_diff(1, BASS),
        create_reverse_set_instrument_diff(1, PIANO),
    );
    for effect in drain_effects(&mut effects) {
        println!("   - Side effect: {:?}", effect);
    }

    println!("\n↩️  Undo / redo:");
    while let Some(description) = session.undo() {
        println!("   - Undid: {}", description);
    }
    println!("   - Sequencers after full undo: {}", session.app_state().sequencers.len());
    while let Some(description) = session.redo() {
        println!("   - Redid: {}", description);
    }
    println!(
        "   - Live controllers: {:?}",
        session.runtime().controllers.ids()
    );

    // Save and load the snapshot
    let path = std::env::temp_dir().join("demo_session.song.json");
    save_song(&SongFile::new("Demo Session", (*session.app_state()).clone()), &path)?;
    println!("\n💾 Saved song to: {}", path.display());

    let loaded = load_song(&path)?;
    session.load(loaded.state);
    println!("📂 Loaded '{}' ({} notes)", loaded.metadata.name, session.app_state().note_count());
    println!("   - Can undo: {}", session.history().can_undo());

    std::fs::remove_file(&path)?;
    Ok(())
}
