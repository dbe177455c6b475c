//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Dedup store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the state file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The state file is not a JSON array of ids.
    #[error("invalid sent-listings file {path}: {source}")]
    Json {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
