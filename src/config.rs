// Engine configuration
//
// Loaded from a RON file; every field has a default so a partial file (or
// none at all) is valid.

use crate::history::DEFAULT_MAX_HISTORY;
use crate::state::timing::is_valid_bpm;
use crate::state::{
    AppState, DEFAULT_TRACK_PAN, DEFAULT_TRACK_VOLUME, SequencerId, SequencerState, SongKey,
    TimeSignature,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default id of the UI element new sequencer controllers are mounted in
pub const DEFAULT_CONTROLLER_CONTAINER: &str = "sequencer-container";

/// Default number of pending side effects the queue holds
pub const DEFAULT_EFFECT_QUEUE_CAPACITY: usize = 256;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Values a new, empty song starts with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongDefaults {
    pub tempo: f64,
    pub time_signature: TimeSignature,
    pub total_measures: u32,
    pub song_key: SongKey,
    pub snap_resolution: f64,
    pub note_duration: f64,
    /// Mix settings of newly created tracks
    pub track_volume: f64,
    pub track_pan: f64,
}

impl Default for SongDefaults {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            time_signature: TimeSignature::four_four(),
            total_measures: 16,
            song_key: SongKey::c_major(),
            snap_resolution: 0.25,
            note_duration: 1.0,
            track_volume: DEFAULT_TRACK_VOLUME,
            track_pan: DEFAULT_TRACK_PAN,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum undo depth (0 = unbounded)
    pub max_history: usize,

    /// UI element controllers are mounted in; None runs headless
    pub controller_container: Option<String>,

    /// Capacity of the side-effect queue
    pub effect_queue_capacity: usize,

    pub song: SongDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            controller_container: Some(DEFAULT_CONTROLLER_CONTAINER.to_string()),
            effect_queue_capacity: DEFAULT_EFFECT_QUEUE_CAPACITY,
            song: SongDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)
            .map_err(|e| ConfigError::Parse(format!("Failed to deserialize from RON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize to RON: {}", e)))
    }

    /// Reject values the engine cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let song = &self.song;
        if !is_valid_bpm(song.tempo) {
            return Err(ConfigError::Invalid(format!(
                "tempo {} BPM out of range",
                song.tempo
            )));
        }
        if !song.time_signature.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "time signature {}",
                song.time_signature
            )));
        }
        if song.total_measures == 0 {
            return Err(ConfigError::Invalid("total_measures must be > 0".into()));
        }
        if song.snap_resolution <= 0.0 || song.note_duration <= 0.0 {
            return Err(ConfigError::Invalid(
                "snap_resolution and note_duration must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&song.track_volume) || !(-1.0..=1.0).contains(&song.track_pan) {
            return Err(ConfigError::Invalid("track mix defaults out of range".into()));
        }
        if self.effect_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "effect_queue_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Empty song built from the configured defaults
    pub fn initial_state(&self) -> AppState {
        let song = &self.song;
        AppState {
            tempo: song.tempo,
            time_signature: song.time_signature,
            total_measures: song.total_measures,
            song_key: song.song_key,
            snap_resolution: song.snap_resolution,
            note_duration: song.note_duration,
            is_triplet_mode: false,
            is_dotted_mode: false,
            sequencers: Vec::new(),
        }
    }

    /// Empty track using the configured mix defaults
    pub fn new_sequencer(&self, id: SequencerId, instrument: impl Into<String>) -> SequencerState {
        SequencerState {
            volume: self.song.track_volume,
            pan: self.song.track_pan,
            ..SequencerState::new(id, instrument)
        }
    }
}
