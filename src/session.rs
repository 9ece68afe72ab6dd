// Session - the single mutation entry point
//
// A Session owns the history (and through it the live snapshot) together
// with the runtime context appliers synchronize. UI code builds a diff pair
// with the factories, hands it to record_diff, and reads state back through
// the getters. Nothing else mutates the snapshot.

use crate::config::EngineConfig;
use crate::diff::Diff;
use crate::history::History;
use crate::runtime::{InstrumentLoaded, RuntimeSyncContext};
use crate::state::{AppState, SongKey, TimeSignature};
use std::sync::Arc;

/// An editing session over one song
pub struct Session<R: RuntimeSyncContext> {
    history: History,
    runtime: R,
}

impl<R: RuntimeSyncContext> Session<R> {
    /// Start a session at `initial`, mounting a controller for each track
    pub fn new(initial: AppState, runtime: R, config: &EngineConfig) -> Self {
        let mut session = Self {
            history: History::with_capacity(initial, config.max_history),
            runtime,
        };
        session.mount_all();
        session
    }

    /// Apply `forward` and record it with its inverse
    pub fn record_diff(&mut self, forward: Diff, reverse: Diff) -> Arc<AppState> {
        self.history.record(forward, reverse, &mut self.runtime)
    }

    /// Revert the most recent change; returns its description
    pub fn undo(&mut self) -> Option<String> {
        self.history.undo(&mut self.runtime)
    }

    /// Reapply the most recently undone change; returns its description
    pub fn redo(&mut self) -> Option<String> {
        self.history.redo(&mut self.runtime)
    }

    /// Replace the song wholesale, e.g. after opening a file
    ///
    /// History is discarded and every live controller is recreated from the
    /// new snapshot.
    pub fn load(&mut self, state: AppState) {
        self.runtime.reset();
        self.history.reset(state);
        self.mount_all();
        log::info!(
            "Loaded song with {} sequencers",
            self.history.snapshot().sequencers.len()
        );
    }

    fn mount_all(&mut self) {
        let state = Arc::clone(self.history.snapshot());
        for sequencer in &state.sequencers {
            if let Err(e) = self.runtime.ensure_controller(sequencer) {
                log::warn!("Could not mount sequencer {}: {}", sequencer.id, e);
            }
        }
    }

    /// Deliver a finished instrument load
    ///
    /// The result is accepted only if the live snapshot still assigns that
    /// instrument to that sequencer. Loads overtaken by a later change or by
    /// undo are dropped and false is returned.
    pub fn complete_instrument_load(&mut self, loaded: &InstrumentLoaded) -> bool {
        let current = self
            .history
            .snapshot()
            .sequencer(loaded.sequencer_id)
            .map(|s| s.instrument.as_str());

        if current != Some(loaded.instrument.as_str()) {
            log::debug!(
                "Dropping stale load of {} for sequencer {} (now {:?})",
                loaded.instrument,
                loaded.sequencer_id,
                current
            );
            return false;
        }

        self.runtime.instrument_ready(loaded);
        true
    }

    /// Current snapshot
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::clone(self.history.snapshot())
    }

    pub fn current_tempo(&self) -> f64 {
        self.history.snapshot().tempo
    }

    pub fn current_time_signature(&self) -> TimeSignature {
        self.history.snapshot().time_signature
    }

    pub fn current_total_measures(&self) -> u32 {
        self.history.snapshot().total_measures
    }

    pub fn current_song_key(&self) -> SongKey {
        self.history.snapshot().song_key
    }

    pub fn current_snap_resolution(&self) -> f64 {
        self.history.snapshot().snap_resolution
    }

    pub fn current_note_duration(&self) -> f64 {
        self.history.snapshot().note_duration
    }

    pub fn current_is_triplet_mode(&self) -> bool {
        self.history.snapshot().is_triplet_mode
    }

    pub fn current_is_dotted_mode(&self) -> bool {
        self.history.snapshot().is_dotted_mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}
