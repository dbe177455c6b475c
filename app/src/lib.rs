//! wgwatch application shell.
//!
//! Wires configuration into the acquisition, notification and store crates
//! and runs a single watch pass. Core logic lives in the `crates/`
//! directory.

pub mod error;
pub mod pipeline;

pub use error::WatchError;

use std::sync::Arc;
use std::time::Duration;
use wgwatch_browser::{ChromiumLauncher, FingerprintConfig, LaunchOptions, Pacing};
use wgwatch_core::AppConfig;
use wgwatch_notify::TelegramNotifier;
use wgwatch_scanner::{Acquirer, Backoff, BrowserScraper, DirectFetcher};
use wgwatch_store::SentStore;

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,wgwatch=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Build the direct-then-browser acquirer described by `config`.
pub fn build_acquirer(config: &AppConfig) -> Result<Acquirer, WatchError> {
    let direct = Arc::new(DirectFetcher::new()?);

    let browser = &config.browser;
    let launcher = ChromiumLauncher::new(LaunchOptions {
        headless: browser.headless,
        user_data_dir: browser.user_data_dir.clone(),
        fingerprint: FingerprintConfig::zurich_desktop()
            .with_viewport(browser.window_width, browser.window_height),
        ..LaunchOptions::default()
    });
    let pacing = Pacing::new(
        Duration::from_millis(browser.pause_min_ms),
        Duration::from_millis(browser.pause_max_ms),
        Duration::from_millis(browser.keystroke_delay_ms),
    );
    let scraper = BrowserScraper::new(Arc::new(launcher), direct.clone()).with_pacing(pacing);

    Ok(Acquirer::new(direct, Arc::new(scraper))
        .with_max_attempts(config.search.max_attempts)
        .with_backoff(Backoff::linear(Duration::from_secs(
            config.search.backoff_step_secs,
        ))))
}

/// Run one watch pass with the given configuration.
pub async fn run(config: &AppConfig) -> Result<usize, WatchError> {
    tracing::info!(
        "Starting wgwatch v{} (query: {:?}, headless: {})",
        env!("CARGO_PKG_VERSION"),
        config.query(),
        config.browser.headless
    );

    let acquirer = build_acquirer(config)?;
    let notifier = TelegramNotifier::from_config(config)?;
    let store = SentStore::new(&config.store.sent_path);

    pipeline::run(&acquirer, &notifier, &store, config.query()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_sources(
            Some("[search]\nmax_attempts = 2\nbackoff_step_secs = 1\n"),
            |name| match name {
                "TG_BOT_TOKEN" => Some("123:abc".to_string()),
                "TG_CHAT_ID" => Some("-1".to_string()),
                "SEARCH_QUERY" => Some("zurich".to_string()),
                _ => None,
            },
        )
        .expect("valid config")
    }

    #[test]
    fn test_build_acquirer_from_config() {
        assert!(build_acquirer(&config()).is_ok());
    }
}
