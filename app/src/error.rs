//! Top-level error for a watch run.

use thiserror::Error;
use wgwatch_core::ConfigError;
use wgwatch_notify::NotifyError;
use wgwatch_scanner::ScanError;
use wgwatch_store::StoreError;

/// Any failure that ends a run.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Configuration missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listings could not be acquired
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A notification was not delivered
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Dedup state could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),
}
