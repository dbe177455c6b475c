use crate::error::Result;
use crate::wait::{poll_until, PollPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An anchor as seen by the live DOM: resolved `href` and rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnchor {
    pub href: String,
    pub text: String,
}

/// Browser actions for automation.
///
/// Every capability the scraping flow needs from a page. The chromium
/// session implements it for real; tests implement it with scripted fakes.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL and wait for the document to load
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current document URL
    async fn current_url(&self) -> Result<String>;

    /// Whether at least one element matches the selector right now
    async fn exists(&self, selector: &str) -> Result<bool>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Wait for the navigation started by the last action to finish loading
    async fn wait_for_load(&self, timeout: Duration) -> Result<()>;

    /// Replace an input's value, firing `input` and `change`
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Type a single character into the focused element matching the selector
    async fn type_char(&self, selector: &str, ch: char) -> Result<()>;

    /// Evaluate a boolean JavaScript expression
    async fn evaluate_bool(&self, expression: &str) -> Result<bool>;

    /// Evaluate a JavaScript expression for its side effects
    async fn run_script(&self, expression: &str) -> Result<()>;

    /// Move the pointer to viewport coordinates
    async fn move_pointer(&self, x: f64, y: f64) -> Result<()>;

    /// Scroll vertically with the mouse wheel
    async fn scroll_by(&self, delta_y: f64) -> Result<()>;

    /// Replace the whole document with the given markup
    async fn set_content(&self, html: &str) -> Result<()>;

    /// All anchors matching the selector, in document order
    async fn anchors(&self, selector: &str) -> Result<Vec<RawAnchor>>;

    /// Wait for a selector to appear
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        poll_until(selector, PollPolicy::within(timeout), move || async move {
            self.exists(selector).await.unwrap_or(false)
        })
        .await
    }
}

/// Render a Rust string as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
