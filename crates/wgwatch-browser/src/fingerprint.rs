/// Desktop Chrome on macOS, matching what the site sees from regular visitors.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept-Language sent by both the browser and the direct HTTP client.
pub const ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en;q=0.8";

/// Fingerprint configuration for anti-detection
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub locale: String,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl FingerprintConfig {
    /// A desktop visitor from Zürich.
    pub fn zurich_desktop() -> Self {
        Self {
            user_agent: DESKTOP_USER_AGENT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
            viewport_width: 1366,
            viewport_height: 768,
            locale: "de-CH".to_string(),
            timezone: "Europe/Zurich".to_string(),
            latitude: 47.3769,
            longitude: 8.5417,
        }
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Chromium command-line switches for this fingerprint.
    pub fn launch_args(&self) -> Vec<String> {
        vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            format!("--window-size={},{}", self.viewport_width, self.viewport_height),
            format!("--lang={}", self.locale),
            format!("--user-agent={}", self.user_agent),
        ]
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self::zurich_desktop()
    }
}

/// Injected before any page script runs.
pub(crate) const STEALTH_SCRIPT: &str = r"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'languages', { get: () => ['de-CH', 'de', 'en'] });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    window.chrome = window.chrome || { runtime: {} };
";
