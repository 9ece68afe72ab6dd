// Song file export/import

use crate::project::types::*;
use crate::project::validate_song_structure;
use crate::state::AppState;
use std::path::Path;

/// Project error types
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("File system error: {0}")]
    FileSystemError(String),

    #[error("Invalid song structure: {0}")]
    InvalidStructure(String),

    #[error("Unsupported song format version {0}")]
    InvalidVersion(SongFormatVersion),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a snapshot to pretty JSON under `name`
pub fn export_json(name: &str, state: &AppState) -> Result<String, ProjectError> {
    let file = SongFile::new(name, state.clone());
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Parse and validate a song file
pub fn import_json(json: &str) -> Result<SongFile, ProjectError> {
    let file: SongFile = serde_json::from_str(json)?;
    if !file.metadata.version.is_compatible() {
        return Err(ProjectError::InvalidVersion(file.metadata.version));
    }
    validate_song_structure(&file.state)?;
    Ok(file)
}

/// Write a song file to disk, creating parent directories as needed
pub fn save_song<P: AsRef<Path>>(file: &SongFile, path: P) -> Result<(), ProjectError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            ProjectError::FileSystemError(format!("Failed to create song directory: {}", e))
        })?;
    }

    let mut file = file.clone();
    file.metadata.touch();
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, json)?;

    log::info!(
        "Saved song '{}' ({} sequencers) to {}",
        file.metadata.name,
        file.state.sequencers.len(),
        path.display()
    );
    Ok(())
}

/// Read a song file from disk
pub fn load_song<P: AsRef<Path>>(path: P) -> Result<SongFile, ProjectError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let file = import_json(&json)?;
    log::info!("Loaded song '{}' from {}", file.metadata.name, path.display());
    Ok(file)
}
