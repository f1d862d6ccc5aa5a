//! File-backed note persistence.
//!
//! The whole collection lives in one JSON array file. Every save rewrites the
//! file in full through a sibling temp file and a rename, so readers never
//! observe a half-written array.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Note;

/// Persistence mirror for the note collection.
pub trait NoteStore: Send {
    /// Read every stored note. Never fails: a missing or corrupt file yields
    /// an empty collection.
    fn load(&self) -> Vec<Note>;

    /// Replace the stored collection with `notes`.
    fn save(&self, notes: &[Note]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "notes.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl NoteStore for JsonFileStore {
    fn load(&self) -> Vec<Note> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No notes file at {}, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read notes file {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<Note>>(&raw) {
            Ok(notes) => {
                tracing::debug!("Loaded {} notes from {}", notes.len(), self.path.display());
                notes
            }
            Err(e) => {
                tracing::warn!(
                    "Notes file {} is corrupt, starting empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(notes)?;
        let tmp = self.temp_path();
        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}
