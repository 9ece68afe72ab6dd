// Side effects - fire-and-forget work requested by appliers
//
// Appliers never wait on I/O. Anything asynchronous (instrument sample
// loading, pushing mix values to the audio graph) is queued here through a
// lock-free ring buffer and picked up by the audio/loader side.

use crate::state::SequencerId;
use ringbuf::{HeapRb, traits::Split};

/// Work the runtime layer hands off to the audio side
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Load the samples for an instrument; completion comes back as `InstrumentLoaded`
    LoadInstrument {
        sequencer_id: SequencerId,
        instrument: String,
    },
    /// Update the gain of a track's audio binding
    SetVolume {
        sequencer_id: SequencerId,
        volume: f64,
    },
    /// Update the stereo position of a track's audio binding
    SetPan { sequencer_id: SequencerId, pan: f64 },
    /// Stop and release a track's voices
    ReleaseTrack { sequencer_id: SequencerId },
}

/// Completion report for a `SideEffect::LoadInstrument` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentLoaded {
    pub sequencer_id: SequencerId,
    pub instrument: String,
}

pub type EffectProducer = ringbuf::HeapProd<SideEffect>;
pub type EffectConsumer = ringbuf::HeapCons<SideEffect>;

pub fn create_effect_channel(capacity: usize) -> (EffectProducer, EffectConsumer) {
    let rb = HeapRb::<SideEffect>::new(capacity);
    rb.split()
}

/// Pop everything currently queued
pub fn drain_effects(consumer: &mut EffectConsumer) -> Vec<SideEffect> {
    use ringbuf::traits::Consumer;

    let mut drained = Vec::new();
    while let Some(effect) = consumer.try_pop() {
        drained.push(effect);
    }
    drained
}
