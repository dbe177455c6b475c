//! wgwatch Core - Foundation crate for the wgwatch listing monitor.
//!
//! This crate provides the listing model shared by both acquisition paths,
//! the normalization rules that turn raw anchors into listings, and the
//! configuration value that every other crate receives from the binary.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML + environment configuration
//! - [`listing`] - `Listing`, `ListingId` and summary normalization
//!
//! # Example
//!
//! ```rust
//! use wgwatch_core::Listing;
//!
//! let listing = Listing::from_anchor(
//!     "https://www.wgzimmer.ch/wglink/de/123456/room.html",
//!     "<b>Zürich</b>  CHF 850",
//! )
//! .expect("well-formed detail link");
//! assert_eq!(listing.id.as_str(), "123456");
//! assert_eq!(listing.summary, "Zürich CHF 850");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod listing;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, SearchConfig, Secret, StoreConfig, TelegramConfig};
pub use error::{ConfigError, ConfigResult};
pub use listing::{EmptyListingId, Listing, ListingId};
