//! Crash-safe storage of the in-progress game.
//!
//! Saves go to a sibling temp file which is flushed to disk and then renamed
//! over the real file, so a reader sees either the old snapshot or the new
//! one. If the rename is refused the fully written temp file is copied over
//! the target instead and the caller is told the save was not atomic.

use crate::snapshot::{GameSnapshot, SnapshotError};
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// How a save reached the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Temp file renamed over the target
    Atomic,
    /// Rename failed; target overwritten in place
    Fallback,
}

type RenameFn = fn(&Path, &Path) -> io::Result<()>;

/// A snapshot file on disk
#[derive(Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    /// Moves the finished temp file over the target
    rename: RenameFn,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rename: replace_file,
        }
    }

    /// Replace the rename step, e.g. with one that always fails
    #[cfg(test)]
    pub(crate) fn with_rename(mut self, rename: RenameFn) -> Self {
        self.rename = rename;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("snapshot"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// A non-empty snapshot file is present
    pub fn exists(&self) -> bool {
        fs::metadata(&self.path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Write `snapshot`, replacing any previous one
    pub fn save(&self, snapshot: &GameSnapshot) -> Result<SaveOutcome, StoreError> {
        let encoded = snapshot.encode()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        if let Err(e) = write_synced(&temp, encoded.as_bytes()) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        match (self.rename)(&temp, &self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Snapshot saved");
                Ok(SaveOutcome::Atomic)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Atomic replace failed, overwriting snapshot in place"
                );
                let copied = fs::copy(&temp, &self.path);
                let _ = fs::remove_file(&temp);
                copied?;
                Ok(SaveOutcome::Fallback)
            }
        }
    }

    /// Read the snapshot. Missing, empty or unreadable files give `Ok(None)`;
    /// only unexpected I/O faults are errors.
    pub fn load(&self) -> Result<Option<GameSnapshot>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(path = %self.path.display(), error = %e, "Saved game is not valid text, ignoring it");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        match GameSnapshot::decode(&text) {
            Ok(snapshot) => {
                info!(
                    path = %self.path.display(),
                    players = snapshot.players.len(),
                    "Saved game loaded"
                );
                Ok(Some(snapshot))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Saved game is corrupt, ignoring it");
                Ok(None)
            }
        }
    }

    /// Delete the snapshot, if any
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Snapshot cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
