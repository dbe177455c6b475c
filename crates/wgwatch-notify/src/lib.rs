//! Notifications for newly found listings.

pub mod error;
pub mod telegram;
pub mod templates;

use async_trait::async_trait;
use wgwatch_core::Listing;

pub use error::{NotifyError, Result};
pub use telegram::TelegramNotifier;
pub use templates::format_message;

/// Delivers one message per listing. Implementations do not retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, listing: &Listing) -> Result<()>;
}
