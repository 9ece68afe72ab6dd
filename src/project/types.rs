// Types for song file persistence

use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Song file format version
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SongFormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl SongFormatVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn current() -> Self {
        Self::new(1, 0)
    }

    /// Files with the same major version can be read by this build
    pub fn is_compatible(&self) -> bool {
        self.major == Self::current().major
    }
}

impl std::fmt::Display for SongFormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Song metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongMetadata {
    /// Song name
    pub name: String,
    /// Version of the file format
    pub version: SongFormatVersion,
    /// Creation timestamp (RFC 3339)
    pub created: String,
    /// Last modification timestamp (RFC 3339)
    pub modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl SongMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            name: name.into(),
            version: SongFormatVersion::current(),
            created: now.clone(),
            modified: now,
            author: None,
        }
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.modified = chrono::Utc::now().to_rfc3339();
    }
}

/// A song as written to disk: metadata plus the snapshot
///
/// Only snapshots are persisted. History is a property of an editing
/// session and is not part of the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongFile {
    pub metadata: SongMetadata,
    pub state: AppState,
}

impl SongFile {
    pub fn new(name: impl Into<String>, state: AppState) -> Self {
        Self {
            metadata: SongMetadata::new(name),
            state,
        }
    }
}
