// src/browser/mod.rs
//! Chromium over CDP, via chromiumoxide.

pub mod page;
pub mod scripts;
pub mod session;

use async_trait::async_trait;

pub use page::ChromeFormSession;
pub use session::BrowserSession;

use crate::environment::BrowserOptions;
use crate::error::ApplyError;
use crate::form::{FormSession, SessionLauncher, ViewportSize};

/// Starts a fresh browser process per session.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    options: BrowserOptions,
}

impl ChromeLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self, viewport: ViewportSize) -> Result<Box<dyn FormSession>, ApplyError> {
        let session = BrowserSession::launch(&self.options, viewport)
            .await
            .map_err(|e| ApplyError::Session(format!("{:#}", e)))?;
        Ok(Box::new(ChromeFormSession::new(session)))
    }
}
