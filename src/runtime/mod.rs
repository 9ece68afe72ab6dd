// Runtime synchronization layer
//
// The snapshot is not the whole world: each sequencer also has a live
// controller (UI mount + audio binding), and a few pointers outside the
// snapshot (last edited track, AI preview, autocomplete marker) have to
// follow it. Appliers reach all of these through RuntimeSyncContext, which
// is injected rather than global so appliers can run against a NoopRuntime
// in tests.
//
// Failures here never roll back a diff. They are reported as SyncError,
// logged by the applier, and the new snapshot is kept.

pub mod controller;
pub mod effects;
pub mod preview;

pub use controller::{ControllerRegistry, SequencerController};
pub use effects::{
    EffectConsumer, EffectProducer, InstrumentLoaded, SideEffect, create_effect_channel,
    drain_effects,
};
pub use preview::PreviewStore;

use crate::config::EngineConfig;
use crate::state::{SequencerId, SequencerState};
use ringbuf::traits::Producer;

/// Errors raised while reconciling live objects with the snapshot
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error("No UI container to mount sequencer {0} in")]
    ContainerMissing(SequencerId),

    #[error("No live controller for sequencer {0}")]
    ControllerMissing(SequencerId),

    #[error("Side-effect queue full, dropped {0:?}")]
    EffectQueueFull(SideEffect),
}

/// Everything outside the snapshot that appliers keep in step with it
pub trait RuntimeSyncContext {
    /// Create the live controller for `sequencer` unless one already exists
    ///
    /// Returns `Ok(true)` when a controller was created, `Ok(false)` when one
    /// was already registered.
    fn ensure_controller(&mut self, sequencer: &SequencerState) -> Result<bool, SyncError>;

    /// Destroy the controller of a sequencer; returns whether one existed
    fn destroy_controller(&mut self, id: SequencerId) -> bool;

    /// Mirror the track's fields onto its live controller
    fn refresh_controller(&mut self, sequencer: &SequencerState) -> Result<(), SyncError>;

    fn last_active_sequencer(&self) -> Option<SequencerId>;

    fn set_last_active_sequencer(&mut self, id: Option<SequencerId>);

    /// Discard any AI suggestion currently shown
    fn clear_preview(&mut self);

    fn set_autocomplete_target(&mut self, beat: Option<f64>);

    /// Queue fire-and-forget work; must not block
    fn dispatch(&mut self, effect: SideEffect) -> Result<(), SyncError>;

    /// An instrument load finished and still matches the snapshot
    fn instrument_ready(&mut self, _loaded: &InstrumentLoaded) {}

    /// Drop every live object, e.g. before loading another song
    fn reset(&mut self);
}

/// Runtime that ignores every call
///
/// Used when only the data transform matters: tests, benches, offline
/// tooling that replays diffs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRuntime;

impl RuntimeSyncContext for NoopRuntime {
    fn ensure_controller(&mut self, _sequencer: &SequencerState) -> Result<bool, SyncError> {
        Ok(false)
    }

    fn destroy_controller(&mut self, _id: SequencerId) -> bool {
        false
    }

    fn refresh_controller(&mut self, _sequencer: &SequencerState) -> Result<(), SyncError> {
        Ok(())
    }

    fn last_active_sequencer(&self) -> Option<SequencerId> {
        None
    }

    fn set_last_active_sequencer(&mut self, _id: Option<SequencerId>) {}

    fn clear_preview(&mut self) {}

    fn set_autocomplete_target(&mut self, _beat: Option<f64>) {}

    fn dispatch(&mut self, _effect: SideEffect) -> Result<(), SyncError> {
        Ok(())
    }

    fn reset(&mut self) {}
}

/// Runtime backing a real editing session
pub struct LiveRuntime {
    /// Live controllers by sequencer id
    pub controllers: ControllerRegistry,

    /// Track most recently edited; used by velocity menus and shortcuts
    pub last_active: Option<SequencerId>,

    pub preview: PreviewStore,

    /// Container new controllers are mounted in; None when the UI is not up
    container: Option<String>,

    /// Queue to the audio/loader side
    effects: EffectProducer,
}

impl LiveRuntime {
    /// Create a runtime sending side effects through `effects`
    pub fn new(effects: EffectProducer, container: Option<String>) -> Self {
        Self {
            controllers: ControllerRegistry::new(),
            last_active: None,
            preview: PreviewStore::new(),
            container,
            effects,
        }
    }

    /// Create a runtime and its side-effect channel from configuration
    pub fn from_config(config: &EngineConfig) -> (Self, EffectConsumer) {
        let (tx, rx) = create_effect_channel(config.effect_queue_capacity.max(1));
        (Self::new(tx, config.controller_container.clone()), rx)
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Attach or detach the UI container
    pub fn set_container(&mut self, container: Option<String>) {
        self.container = container;
    }
}

impl RuntimeSyncContext for LiveRuntime {
    fn ensure_controller(&mut self, sequencer: &SequencerState) -> Result<bool, SyncError> {
        if self.controllers.contains(sequencer.id) {
            return Ok(false);
        }
        let container = self
            .container
            .as_deref()
            .ok_or(SyncError::ContainerMissing(sequencer.id))?;

        let controller = SequencerController::mount(sequencer, container);
        log::debug!(
            "Mounted controller {} for sequencer {}",
            controller.instance_id,
            sequencer.id
        );
        self.controllers.register(controller);
        Ok(true)
    }

    fn destroy_controller(&mut self, id: SequencerId) -> bool {
        match self.controllers.unregister(id) {
            Some(controller) => {
                log::debug!(
                    "Destroyed controller {} for sequencer {}",
                    controller.instance_id,
                    id
                );
                true
            }
            None => false,
        }
    }

    fn refresh_controller(&mut self, sequencer: &SequencerState) -> Result<(), SyncError> {
        let controller = self
            .controllers
            .get_mut(sequencer.id)
            .ok_or(SyncError::ControllerMissing(sequencer.id))?;
        controller.mirror(sequencer);
        Ok(())
    }

    fn last_active_sequencer(&self) -> Option<SequencerId> {
        self.last_active
    }

    fn set_last_active_sequencer(&mut self, id: Option<SequencerId>) {
        self.last_active = id;
    }

    fn clear_preview(&mut self) {
        self.preview.clear();
    }

    fn set_autocomplete_target(&mut self, beat: Option<f64>) {
        self.preview.autocomplete_target_beat = beat;
    }

    fn dispatch(&mut self, effect: SideEffect) -> Result<(), SyncError> {
        self.effects
            .try_push(effect)
            .map_err(SyncError::EffectQueueFull)
    }

    fn instrument_ready(&mut self, loaded: &InstrumentLoaded) {
        if let Some(controller) = self.controllers.get_mut(loaded.sequencer_id) {
            controller.loaded_instrument = Some(loaded.instrument.clone());
        }
    }

    fn reset(&mut self) {
        let dropped = self.controllers.clear();
        self.last_active = None;
        self.preview = PreviewStore::new();
        log::debug!("Runtime reset, {} controllers dropped", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piano(id: SequencerId) -> SequencerState {
        SequencerState::new(id, "sf2/fluidr3-gm/acoustic_grand_piano")
    }

    fn live() -> (LiveRuntime, EffectConsumer) {
        let (tx, rx) = create_effect_channel(8);
        (LiveRuntime::new(tx, Some("sequencer-container".into())), rx)
    }

    #[test]
    fn test_ensure_controller_is_idempotent() {
        let (mut runtime, _rx) = live();
        assert_eq!(runtime.ensure_controller(&piano(1)), Ok(true));
        let first = runtime.controllers.get(1).unwrap().instance_id;

        assert_eq!(runtime.ensure_controller(&piano(1)), Ok(false));
        assert_eq!(runtime.controllers.get(1).unwrap().instance_id, first);
        assert_eq!(runtime.controllers.len(), 1);
    }

    #[test]
    fn test_missing_container() {
        let (tx, _rx) = create_effect_channel(8);
        let mut runtime = LiveRuntime::new(tx, None);
        assert_eq!(
            runtime.ensure_controller(&piano(1)),
            Err(SyncError::ContainerMissing(1))
        );
        assert!(runtime.controllers.is_empty());
    }

    #[test]
    fn test_container_attached_later() {
        let (tx, _rx) = create_effect_channel(8);
        let mut runtime = LiveRuntime::new(tx, None);
        assert_eq!(runtime.container(), None);
        assert!(runtime.ensure_controller(&piano(1)).is_err());

        runtime.set_container(Some("sequencer-container".into()));
        assert_eq!(runtime.container(), Some("sequencer-container"));
        assert_eq!(runtime.ensure_controller(&piano(1)), Ok(true));

        runtime.set_container(None);
        assert_eq!(
            runtime.ensure_controller(&piano(2)),
            Err(SyncError::ContainerMissing(2))
        );
        assert!(runtime.controllers.contains(1));
    }

    #[test]
    fn test_refresh_without_controller() {
        let (mut runtime, _rx) = live();
        assert_eq!(
            runtime.refresh_controller(&piano(9)),
            Err(SyncError::ControllerMissing(9))
        );
    }

    #[test]
    fn test_dispatch_reaches_consumer() {
        let (mut runtime, mut rx) = live();
        runtime
            .dispatch(SideEffect::SetVolume {
                sequencer_id: 1,
                volume: 0.4,
            })
            .unwrap();

        assert_eq!(
            drain_effects(&mut rx),
            vec![SideEffect::SetVolume {
                sequencer_id: 1,
                volume: 0.4
            }]
        );
    }

    #[test]
    fn test_dispatch_full_queue() {
        let (tx, _rx) = create_effect_channel(1);
        let mut runtime = LiveRuntime::new(tx, None);
        let effect = SideEffect::ReleaseTrack { sequencer_id: 1 };
        assert!(runtime.dispatch(effect.clone()).is_ok());
        assert_eq!(
            runtime.dispatch(effect.clone()),
            Err(SyncError::EffectQueueFull(effect))
        );
    }

    #[test]
    fn test_reset_drops_everything() {
        let (mut runtime, _rx) = live();
        runtime.ensure_controller(&piano(1)).unwrap();
        runtime.set_last_active_sequencer(Some(1));
        runtime.preview.show(1, vec![crate::state::Note::new("C5", 4.0, 1.0)]);

        runtime.reset();
        assert!(runtime.controllers.is_empty());
        assert_eq!(runtime.last_active_sequencer(), None);
        assert!(!runtime.preview.is_active());
    }

    #[test]
    fn test_instrument_ready_marks_controller() {
        let (mut runtime, _rx) = live();
        runtime.ensure_controller(&piano(1)).unwrap();
        runtime.instrument_ready(&InstrumentLoaded {
            sequencer_id: 1,
            instrument: "sf2/fluidr3-gm/acoustic_grand_piano".into(),
        });
        assert_eq!(
            runtime.controllers.get(1).unwrap().loaded_instrument.as_deref(),
            Some("sf2/fluidr3-gm/acoustic_grand_piano")
        );
    }
}
