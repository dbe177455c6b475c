//! wgwatch Scanner - listing acquisition.
//!
//! Finds current wgzimmer.ch listings for a search query. A plain HTTP
//! fetch is tried first; when it fails or comes back empty, a chromium
//! session runs the site's own search form. The [`Acquirer`] retries the
//! whole sequence with a linear backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wgwatch_browser::{ChromiumLauncher, LaunchOptions};
//! use wgwatch_scanner::{Acquirer, BrowserScraper, DirectFetcher};
//!
//! let direct = Arc::new(DirectFetcher::new()?);
//! let browser = BrowserScraper::new(
//!     Arc::new(ChromiumLauncher::new(LaunchOptions::default())),
//!     direct.clone(),
//! );
//! let acquirer = Acquirer::new(direct, Arc::new(browser));
//!
//! let listings = acquirer.acquire("zurich").await?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod direct;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod session;
pub mod source;
pub mod url_builder;

// Re-export commonly used types
pub use direct::DirectFetcher;
pub use error::{Result, ScanError};
pub use orchestrator::{Acquirer, Backoff};
pub use parser::{listings_from_anchors, parse_listings, render_results_html};
pub use session::{BrowserScraper, ResultsStrategy, SubmitStrategy, Timings};
pub use source::ListingSource;
pub use url_builder::build_search_url;
