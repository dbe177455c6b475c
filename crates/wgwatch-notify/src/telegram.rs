use crate::error::{NotifyError, Result};
use crate::templates::format_message;
use crate::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use wgwatch_core::{AppConfig, Listing, Secret};

/// Sends listings to a Telegram chat through the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: Secret,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        token: Secret,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            chat_id: chat_id.into(),
        })
    }

    /// Notifier for a validated configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.telegram.api_base.clone(),
            Secret::new(config.bot_token()),
            config.chat_id(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token.expose())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, listing: &Listing) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: format_message(listing),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // Strip the URL from transport errors: it carries the bot token.
        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Notified listing {}", listing.id);
        Ok(())
    }
}
