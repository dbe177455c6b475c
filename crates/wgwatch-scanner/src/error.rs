use thiserror::Error;
use wgwatch_browser::BrowserError;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("direct fetch failed: {0}")]
    Fetch(String),

    #[error("CAPTCHA not ready: {0}")]
    CaptchaNotReady(String),

    #[error("scrape failed: {0}")]
    Scrape(String),

    #[error("acquisition failed after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
