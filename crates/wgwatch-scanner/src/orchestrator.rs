//! Acquisition orchestration.
//!
//! Each attempt tries the direct source first and falls back to the browser
//! source once. Failed attempts are retried with a linearly growing delay.

use crate::error::{Result, ScanError};
use crate::source::ListingSource;
use std::sync::Arc;
use std::time::Duration;
use wgwatch_core::Listing;

/// Default number of acquisition attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default backoff step.
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(10);

/// Delay schedule between failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    step: Duration,
}

impl Backoff {
    /// `step * attempt` after the given attempt.
    pub const fn linear(step: Duration) -> Self {
        Self { step }
    }

    /// Delay after the 1-based `attempt` failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::linear(DEFAULT_BACKOFF_STEP)
    }
}

/// Acquires listings for a query from a direct and a browser source.
pub struct Acquirer {
    direct: Arc<dyn ListingSource>,
    browser: Arc<dyn ListingSource>,
    max_attempts: u32,
    backoff: Backoff,
}

impl Acquirer {
    pub fn new(direct: Arc<dyn ListingSource>, browser: Arc<dyn ListingSource>) -> Self {
        Self {
            direct,
            browser,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Acquire listings, retrying failed attempts.
    ///
    /// The first successful attempt wins. After the last failure its error
    /// is returned.
    pub async fn acquire(&self, query: &str) -> Result<Vec<Listing>> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.scrape_once(query).await {
                Ok(listings) => {
                    tracing::info!(
                        "Acquired {} listing(s) on attempt {}/{}",
                        listings.len(),
                        attempt,
                        self.max_attempts
                    );
                    return Ok(listings);
                }
                Err(e) => {
                    if attempt < self.max_attempts {
                        let delay = self.backoff.delay_after(attempt);
                        tracing::warn!(
                            "Attempt {}/{} failed: {}. Retrying in {:?}...",
                            attempt,
                            self.max_attempts,
                            e,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        tracing::warn!("Attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ScanError::Exhausted {
            attempts: self.max_attempts,
        }))
    }

    /// One attempt: direct source, then the browser source if the direct
    /// one failed or came back empty.
    pub async fn scrape_once(&self, query: &str) -> Result<Vec<Listing>> {
        match self.direct.fetch(query).await {
            Ok(listings) if !listings.is_empty() => return Ok(listings),
            Ok(_) => tracing::info!("{} source found nothing", self.direct.name()),
            Err(e) => tracing::warn!("{} source failed: {}", self.direct.name(), e),
        }

        tracing::info!("Falling back to the {} source", self.browser.name());
        self.browser.fetch(query).await
    }
}
