// Note representation for the piano roll
// A note is identified only by its (pitch, start, duration) tuple; there is no stable id.

use serde::{Deserialize, Serialize};

/// Velocity given to notes that do not specify one
pub const DEFAULT_VELOCITY: u8 = 100;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

fn default_velocity() -> u8 {
    DEFAULT_VELOCITY
}

/// A note placed on the piano roll grid
///
/// Positions and lengths are in beats from the song origin, so a note keeps
/// its musical placement when the tempo changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Scientific pitch name, e.g. "C4" or "F#3"
    pub pitch: String,

    /// Start position in beats
    pub start: f64,

    /// Duration in beats
    pub duration: f64,

    /// MIDI velocity (0-127)
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

impl Note {
    /// Creates a note with the default velocity
    pub fn new(pitch: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            pitch: pitch.into(),
            start,
            duration,
            velocity: DEFAULT_VELOCITY,
        }
    }

    /// Returns a copy with another velocity, clamped to the MIDI range
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.min(127);
        self
    }

    /// End position in beats
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Tuple identity: same pitch, start and duration
    pub fn same_slot(&self, other: &Note) -> bool {
        self.pitch == other.pitch && self.start == other.start && self.duration == other.duration
    }

    /// Same pitch and start, whatever the duration
    pub fn same_onset(&self, pitch: &str, start: f64) -> bool {
        self.pitch == pitch && self.start == start
    }

    /// MIDI note number for the pitch name (C4 = 60), if it parses
    pub fn midi_number(&self) -> Option<u8> {
        pitch_to_midi(&self.pitch)
    }
}

/// Parse a pitch name like "C4", "Db3" or "G#-1" into a MIDI note number
pub fn pitch_to_midi(pitch: &str) -> Option<u8> {
    let mut chars = pitch.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (offset, octave_str) = if let Some(stripped) = rest.strip_prefix('#') {
        (1, stripped)
    } else if let Some(stripped) = rest.strip_prefix('b') {
        (-1, stripped)
    } else {
        (0, rest)
    };

    let octave: i32 = octave_str.parse().ok()?;
    let number = (octave + 1) * 12 + base + offset;
    u8::try_from(number).ok().filter(|n| *n <= 127)
}

/// Get the note name for a MIDI number (e.g., 60 -> "C4", 82 -> "A#5")
pub fn midi_to_pitch(number: u8) -> String {
    let octave = (number / 12) as i32 - 1;
    let note_index = (number % 12) as usize;
    format!("{}{}", NOTE_NAMES[note_index], octave)
}
