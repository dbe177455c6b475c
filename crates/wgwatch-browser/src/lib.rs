//! Browser automation engine for the wgwatch scraping flow.
//!
//! Provides a chromium session with anti-fingerprinting, the capability
//! trait the scraper drives pages through, humanized pacing, and the
//! polling primitive behind every bounded wait.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod launcher;
pub mod pacing;
pub mod wait;

pub use actions::{BrowserActions, RawAnchor};
pub use engine::{BrowserEngine, BrowserPage, LaunchOptions};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use launcher::{ChromiumLauncher, Launcher, Session};
pub use pacing::Pacing;
pub use wait::{poll_until, PollPolicy};
