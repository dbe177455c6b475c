//! Session lifecycle seams.
//!
//! The scraper never launches chromium directly: it asks a [`Launcher`] for a
//! [`Session`] and hands it back through [`Session::close`] on every exit
//! path, which lets tests observe the cleanup with fake sessions.

use crate::actions::BrowserActions;
use crate::engine::{BrowserEngine, LaunchOptions};
use crate::error::Result;
use async_trait::async_trait;

/// An open browser session owning one page.
#[async_trait]
pub trait Session: Send + Sync {
    /// The page to drive
    fn page(&self) -> &dyn BrowserActions;

    /// Release the session. Must not fail.
    async fn close(self: Box<Self>);
}

/// Starts browser sessions.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Session>>;
}

/// Launches real chromium sessions.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    options: LaunchOptions,
}

impl ChromiumLauncher {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Launcher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn Session>> {
        let engine = BrowserEngine::launch(self.options.clone()).await?;
        Ok(Box::new(engine))
    }
}

#[async_trait]
impl Session for BrowserEngine {
    fn page(&self) -> &dyn BrowserActions {
        BrowserEngine::page(self)
    }

    async fn close(self: Box<Self>) {
        BrowserEngine::close(*self).await;
    }
}
