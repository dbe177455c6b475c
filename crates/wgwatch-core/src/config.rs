//! Configuration management for wgwatch.
//!
//! Tuning knobs live in an optional TOML file (path taken from
//! `WGWATCH_CONFIG`); secrets and the per-deployment values come from the
//! environment and always win over the file.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the optional TOML config path.
pub const CONFIG_PATH_VAR: &str = "WGWATCH_CONFIG";
/// Telegram bot token (required, never read from file).
pub const BOT_TOKEN_VAR: &str = "TG_BOT_TOKEN";
/// Telegram chat destination (required).
pub const CHAT_ID_VAR: &str = "TG_CHAT_ID";
/// Search query (required).
pub const QUERY_VAR: &str = "SEARCH_QUERY";
/// Headless browser flag (optional, default true).
pub const HEADLESS_VAR: &str = "HEADLESS";
/// Persistent browser profile directory (optional).
pub const USER_DATA_DIR_VAR: &str = "USER_DATA_DIR";

const TRUTHY: [&str; 5] = ["1", "true", "yes", "y", "on"];

/// Main application configuration.
///
/// Loaded once at startup and handed to each component by value or
/// reference; nothing below `main` reads the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Notification destination
    pub telegram: TelegramConfig,
    /// What to search and how hard to retry
    pub search: SearchConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Dedup state location
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads the TOML file named by `WGWATCH_CONFIG` when set, then layers
    /// environment variables on top and validates required values.
    pub fn load_with_env() -> ConfigResult<Self> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Some(Self::read_file(Path::new(&path))?),
            Err(_) => None,
        };
        Self::from_sources(file.as_deref(), |name| std::env::var(name).ok())
    }

    /// Build configuration from optional TOML contents and a variable lookup.
    pub fn from_sources<F>(toml_contents: Option<&str>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = match toml_contents {
            Some(contents) => toml::from_str(contents)?,
            None => Self::default(),
        };

        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(BOT_TOKEN_VAR) {
            config.telegram.bot_token = Some(Secret(token));
        }
        if let Some(chat_id) = non_empty(CHAT_ID_VAR) {
            config.telegram.chat_id = Some(chat_id);
        }
        if let Some(query) = non_empty(QUERY_VAR) {
            config.search.query = Some(query);
        }
        if let Some(raw) = lookup(HEADLESS_VAR) {
            config.browser.headless = parse_truthy(&raw);
            tracing::debug!("Override browser.headless from env: {}", config.browser.headless);
        }
        if let Some(dir) = non_empty(USER_DATA_DIR_VAR) {
            config.browser.user_data_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        tracing::debug!("Loading config from {}", path.display());
        Ok(fs::read_to_string(path)?)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.telegram.bot_token.is_none() {
            return Err(missing(BOT_TOKEN_VAR));
        }
        if self.telegram.chat_id.as_deref().map_or(true, str::is_empty) {
            return Err(missing(CHAT_ID_VAR));
        }
        if self.search.query.as_deref().map_or(true, str::is_empty) {
            return Err(missing(QUERY_VAR));
        }
        if self.search.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.browser.pause_min_ms > self.browser.pause_max_ms {
            return Err(ConfigError::InvalidValue {
                field: "browser.pause_min_ms".to_string(),
                reason: "must not exceed browser.pause_max_ms".to_string(),
            });
        }
        Ok(())
    }

    /// The bot token. Only valid on a validated config.
    #[must_use]
    pub fn bot_token(&self) -> &str {
        self.telegram.bot_token.as_ref().map_or("", Secret::expose)
    }

    /// The chat destination. Only valid on a validated config.
    #[must_use]
    pub fn chat_id(&self) -> &str {
        self.telegram.chat_id.as_deref().unwrap_or_default()
    }

    /// The search query. Only valid on a validated config.
    #[must_use]
    pub fn query(&self) -> &str {
        self.search.query.as_deref().unwrap_or_default()
    }
}

fn missing(name: &str) -> ConfigError {
    ConfigError::MissingVar {
        name: name.to_string(),
    }
}

/// Interpret a flag value: `1`, `true`, `yes`, `y`, `on` (any case) are true,
/// everything else is false.
#[must_use]
pub fn parse_truthy(raw: &str) -> bool {
    let value = raw.trim().to_ascii_lowercase();
    TRUTHY.contains(&value.as_str())
}

/// String that never shows up in logs or `Debug` output.
#[derive(Clone, Default)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Telegram destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_base: String,
    /// Chat id or `@channel` name
    pub chat_id: Option<String>,
    /// Bot token (environment only)
    #[serde(skip)]
    pub bot_token: Option<Secret>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            chat_id: None,
            bot_token: None,
        }
    }
}

/// Search and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Free-text search query
    pub query: Option<String>,
    /// Full acquisition cycles before giving up
    pub max_attempts: u32,
    /// Backoff step; attempt `n` is followed by `n * step` seconds of sleep
    pub backoff_step_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: None,
            max_attempts: 4,
            backoff_step_secs: 10,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Reuse a persistent profile directory (cookies, consent state)
    pub user_data_dir: Option<PathBuf>,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Lower bound of humanized pauses
    pub pause_min_ms: u64,
    /// Upper bound of humanized pauses
    pub pause_max_ms: u64,
    /// Delay between typed characters
    pub keystroke_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: None,
            window_width: 1366,
            window_height: 768,
            pause_min_ms: 4_000,
            pause_max_ms: 10_000,
            keystroke_delay_ms: 80,
        }
    }
}

/// Dedup state settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding already-notified listing ids
    pub sent_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sent_path: PathBuf::from("data").join("sent.json"),
        }
    }
}
