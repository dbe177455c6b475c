use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
