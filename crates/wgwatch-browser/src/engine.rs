use crate::actions::{js_string, BrowserActions, RawAnchor};
use crate::error::{BrowserError, Result};
use crate::fingerprint::{FingerprintConfig, STEALTH_SCRIPT};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetGeolocationOverrideParams, SetLocaleOverrideParams, SetTimezoneOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How the browser process is started.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Persistent profile; a throwaway profile is used when `None`
    pub user_data_dir: Option<PathBuf>,
    pub fingerprint: FingerprintConfig,
    pub navigation_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: None,
            fingerprint: FingerprintConfig::default(),
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

/// Browser automation engine: one chromium process with one prepared tab.
///
/// Must be released with [`BrowserEngine::close`]; dropping it leaves the
/// process to be reaped by chromiumoxide's own drop handling.
pub struct BrowserEngine {
    browser: Browser,
    page: BrowserPage,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch chromium and prepare a tab with the configured fingerprint.
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        let fingerprint = &options.fingerprint;
        let mut builder = BrowserConfig::builder()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .viewport(Viewport {
                width: fingerprint.viewport_width,
                height: fingerprint.viewport_height,
                device_scale_factor: Some(1.0),
                ..Default::default()
            })
            .request_timeout(options.navigation_timeout)
            .args(fingerprint.launch_args());

        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(dir) = &options.user_data_dir {
            tracing::debug!("Using persistent browser profile at {}", dir.display());
            builder = builder.user_data_dir(dir);
        }

        let config = builder.build().map_err(BrowserError::ChromiumError)?;
        let (mut browser, mut handler) = Browser::launch(config).await?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error (continuing): {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(e.into());
            }
        };

        let engine = Self {
            browser,
            page: BrowserPage {
                page,
                viewport: (
                    f64::from(fingerprint.viewport_width),
                    f64::from(fingerprint.viewport_height),
                ),
            },
            handler,
        };

        let prepared = engine.page.apply_fingerprint(fingerprint).await;
        if let Err(e) = prepared {
            engine.close().await;
            return Err(e);
        }

        tracing::info!(
            "Browser launched (headless: {}, persistent profile: {})",
            options.headless,
            options.user_data_dir.is_some()
        );
        Ok(engine)
    }

    /// The prepared tab.
    pub fn page(&self) -> &BrowserPage {
        &self.page
    }

    /// Shut the browser down and stop the event handler. Never fails.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close error (ignored): {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser wait error (ignored): {}", e);
        }
        self.handler.abort();
        tracing::debug!("Browser session released");
    }
}

/// A chromium tab driven through the devtools protocol.
#[derive(Clone)]
pub struct BrowserPage {
    page: Page,
    viewport: (f64, f64),
}

impl BrowserPage {
    async fn apply_fingerprint(&self, fingerprint: &FingerprintConfig) -> Result<()> {
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(fingerprint.user_agent.clone())
            .accept_language(fingerprint.accept_language.clone())
            .build()
            .map_err(BrowserError::ChromiumError)?;
        self.page.execute(user_agent).await?;

        self.page
            .execute(SetTimezoneOverrideParams::new(fingerprint.timezone.clone()))
            .await?;
        self.page
            .execute(SetLocaleOverrideParams {
                locale: Some(fingerprint.locale.clone()),
            })
            .await?;
        self.page
            .execute(SetGeolocationOverrideParams {
                latitude: Some(fingerprint.latitude),
                longitude: Some(fingerprint.longitude),
                accuracy: Some(100.0),
                ..Default::default()
            })
            .await?;

        // Not every chromium build accepts permission grants on a page session.
        if let Err(e) = self
            .page
            .execute(GrantPermissionsParams::new(vec![PermissionType::Geolocation]))
            .await
        {
            tracing::debug!("Geolocation permission grant ignored: {}", e);
        }
        Ok(())
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(&self, expression: &str) -> Result<T> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        self.evaluate(&format!(
            "document.querySelector({}) !== null",
            js_string(selector)
        ))
        .await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.click().await?;
        Ok(())
    }

    async fn wait_for_load(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.wait_for_navigation()).await {
            Ok(loaded) => {
                loaded?;
                Ok(())
            }
            Err(_) => Err(BrowserError::Timeout(format!(
                "page load not finished after {timeout:?}"
            ))),
        }
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let script = format!(
            r"(() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.focus();
                el.value = {};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()",
            js_string(selector),
            js_string(value)
        );
        if self.evaluate::<bool>(&script).await? {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(selector.to_string()))
        }
    }

    async fn type_char(&self, selector: &str, ch: char) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.focus().await?;

        // Key definitions only cover a US layout; umlauts go through insertText.
        if element.type_str(ch.to_string()).await.is_err() {
            self.page
                .execute(InsertTextParams::new(ch.to_string()))
                .await?;
        }
        Ok(())
    }

    async fn evaluate_bool(&self, expression: &str) -> Result<bool> {
        self.evaluate(expression).await
    }

    async fn run_script(&self, expression: &str) -> Result<()> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        Ok(())
    }

    async fn move_pointer(&self, x: f64, y: f64) -> Result<()> {
        self.page
            .execute(DispatchMouseEventParams::new(
                DispatchMouseEventType::MouseMoved,
                x,
                y,
            ))
            .await?;
        Ok(())
    }

    async fn scroll_by(&self, delta_y: f64) -> Result<()> {
        let (width, height) = self.viewport;
        let wheel = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseWheel)
            .x(width / 2.0)
            .y(height / 2.0)
            .delta_x(0.0)
            .delta_y(delta_y)
            .build()
            .map_err(BrowserError::ChromiumError)?;
        self.page.execute(wheel).await?;
        Ok(())
    }

    async fn set_content(&self, html: &str) -> Result<()> {
        self.run_script(&format!(
            "document.open(); document.write({}); document.close();",
            js_string(html)
        ))
        .await
    }

    async fn anchors(&self, selector: &str) -> Result<Vec<RawAnchor>> {
        self.evaluate(&format!(
            "Array.from(document.querySelectorAll({}))
                .map(a => ({{ href: a.href || '', text: a.innerText || '' }}))
                .filter(a => a.href)",
            js_string(selector)
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_launch_options() {
        let options = LaunchOptions::default();
        assert!(options.headless);
        assert!(options.user_data_dir.is_none());
        assert_eq!(options.fingerprint, FingerprintConfig::zurich_desktop());
        assert_eq!(options.navigation_timeout, Duration::from_secs(60));
    }
}
