// Piano-roll DAW - undoable song state engine

pub mod config;
pub mod diff;
pub mod history;
pub mod project;
pub mod runtime;
pub mod session;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{ConfigError, EngineConfig, SongDefaults};
pub use diff::{Diff, DiffKind, NoteResize, ResizeTarget, apply_diff};
pub use history::{History, HistoryEntry};
pub use project::{ProjectError, SongFile};
pub use runtime::{
    InstrumentLoaded, LiveRuntime, NoopRuntime, RuntimeSyncContext, SideEffect, SyncError,
};
pub use session::Session;
pub use state::{AppState, Note, SequencerId, SequencerState, SongKey, TimeSignature};
