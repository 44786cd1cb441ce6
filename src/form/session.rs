// src/form/session.rs
//! The seam between the engine and whatever drives a real page.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::controls::FormControl;
use crate::error::ApplyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// One isolated page. Nothing is shared between sessions.
#[async_trait]
pub trait FormSession: Send {
    /// Load `url` and return once the document has finished its initial load.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Current interactive elements, in document order.
    async fn controls(&mut self) -> Result<Vec<FormControl>>;

    async fn fill(&mut self, control: &FormControl, value: &str) -> Result<()>;

    /// Set the file on a native file input directly.
    async fn attach_file(&mut self, control: &FormControl, path: &Path) -> Result<()>;

    /// Click `control` and answer the file chooser it opens within `wait`.
    /// Returns `false` when no chooser appeared.
    async fn attach_via_chooser(
        &mut self,
        control: &FormControl,
        path: &Path,
        wait: Duration,
    ) -> Result<bool>;

    async fn click(&mut self, control: &FormControl) -> Result<()>;

    /// Full-page PNG written to `path`.
    async fn screenshot(&mut self, path: &Path) -> Result<()>;

    async fn content(&mut self) -> Result<String>;

    /// Release the page and its browser. Must be safe to call after any failure.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, viewport: ViewportSize) -> Result<Box<dyn FormSession>, ApplyError>;
}
