// Timing - Tempo and meter values held by the song snapshot
// Beats are always counted in quarter notes, like the piano roll grid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tempo bounds accepted by the editor UI
pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 999.0;

/// Time signature (beats per bar / beat unit)
/// Example: 6/8 time = TimeSignature { beats_per_bar: 6, beat_unit: 8 }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    pub beats_per_bar: u8, // Beats per bar (typically 3, 4, 5, 6, 7)
    pub beat_unit: u8,     // Note value (4 = quarter note, 8 = eighth note)
}

impl TimeSignature {
    /// Creates a new time signature
    ///
    /// No validation happens here: diffs carry whatever the UI produced and
    /// appliers never reject a value. Use [`TimeSignature::is_valid`] at the
    /// input boundary.
    pub const fn new(beats_per_bar: u8, beat_unit: u8) -> Self {
        Self {
            beats_per_bar,
            beat_unit,
        }
    }

    /// Common 4/4 time signature
    pub const fn four_four() -> Self {
        Self::new(4, 4)
    }

    /// Common 3/4 time signature (waltz)
    pub const fn three_four() -> Self {
        Self::new(3, 4)
    }

    /// Common 6/8 time signature
    pub const fn six_eight() -> Self {
        Self::new(6, 8)
    }

    /// Beats 1-32, unit a power of two no larger than 32
    pub fn is_valid(&self) -> bool {
        (1..=32).contains(&self.beats_per_bar)
            && self.beat_unit.is_power_of_two()
            && self.beat_unit <= 32
    }

    /// Beat duration relative to quarter note
    /// Example: 4/4 = 1.0, 6/8 = 0.5 (eighth notes)
    pub fn beat_duration_multiplier(&self) -> f64 {
        4.0 / self.beat_unit as f64
    }

    /// Length of one measure in quarter-note beats
    pub fn beats_per_measure(&self) -> f64 {
        self.beats_per_bar as f64 * self.beat_duration_multiplier()
    }

    /// Length of `measures` measures in quarter-note beats
    pub fn song_length_beats(&self, measures: u32) -> f64 {
        self.beats_per_measure() * measures as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}

/// Duration of one beat in seconds at the given tempo
pub fn beat_duration_seconds(bpm: f64) -> f64 {
    60.0 / bpm
}

/// Whether a tempo lies inside the range the editor accepts
pub fn is_valid_bpm(bpm: f64) -> bool {
    (MIN_BPM..=MAX_BPM).contains(&bpm)
}
