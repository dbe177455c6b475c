//! wgwatch Dedup Store
//!
//! Remembers which listings were already notified, as a JSON array of ids
//! in a single file.
//!
//! # Example
//!
//! ```no_run
//! use wgwatch_store::SentStore;
//!
//! let store = SentStore::new("data/sent.json");
//! let sent = store.load()?;
//! // ... notify, then record ...
//! store.save(&sent)?;
//! # Ok::<(), wgwatch_store::StoreError>(())
//! ```
//!
//! Writes go to a temporary file in the same directory which is then
//! renamed over the state file, so a crash never leaves a truncated file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod sent;

pub use error::{Result, StoreError};
pub use sent::SentSet;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File-backed [`SentSet`].
#[derive(Debug, Clone)]
pub struct SentStore {
    path: PathBuf,
}

impl SentStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the set, creating the directory and an empty `[]` file when
    /// nothing was stored yet.
    pub fn load(&self) -> Result<SentSet> {
        if !self.path.exists() {
            tracing::info!("No sent-listings file at {}, starting empty", self.path.display());
            let empty = SentSet::new();
            self.save(&empty)?;
            return Ok(empty);
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let sent: SentSet =
            serde_json::from_str(&contents).map_err(|e| StoreError::json(&self.path, e))?;
        tracing::debug!("Loaded {} sent listing id(s)", sent.len());
        Ok(sent)
    }

    /// Replace the stored set atomically.
    pub fn save(&self, sent: &SentSet) -> Result<()> {
        let dir = self.directory();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut json =
            serde_json::to_string_pretty(sent).map_err(|e| StoreError::json(&self.path, e))?;
        json.push('\n');

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let tmp_path = tmp.path().to_path_buf();
        tmp.write_all(json.as_bytes())
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        tracing::debug!("Saved {} sent listing id(s) to {}", sent.len(), self.path.display());
        Ok(())
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
