// src/browser/page.rs
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::{BackendNodeId, SetFileInputFilesParams};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventFileChooserOpened, NavigateParams,
    SetInterceptFileChooserDialogParams,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::scripts::{DOCUMENT_READY_SCRIPT, FILL_FUNCTION, INVENTORY_SCRIPT, MARK_STALE_SCRIPT};
use super::session::BrowserSession;
use crate::app_log;
use crate::form::{FormControl, FormSession};

const READY_POLL: Duration = Duration::from_millis(100);

/// `FormSession` backed by a real Chromium page.
pub struct ChromeFormSession {
    session: BrowserSession,
}

#[derive(Debug, Deserialize)]
struct FillResult {
    ok: bool,
    reason: Option<String>,
}

impl ChromeFormSession {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }

    async fn backend_node(&self, control: &FormControl) -> Result<BackendNodeId> {
        let element = self
            .session
            .page
            .find_element(control.selector())
            .await
            .with_context(|| format!("{} is no longer in the page", control.describe()))?;
        Ok(element.backend_node_id)
    }

    async fn set_files(&self, node: BackendNodeId, path: &Path) -> Result<()> {
        let absolute = path
            .canonicalize()
            .with_context(|| format!("Document not found: {}", path.display()))?;

        let mut params = SetFileInputFilesParams::new(vec![absolute.display().to_string()]);
        params.backend_node_id = Some(node);
        self.session
            .page
            .execute(params)
            .await
            .context("Browser refused the file")?;
        Ok(())
    }

    async fn answer_chooser(
        &mut self,
        control: &FormControl,
        path: &Path,
        wait: Duration,
        choosers: &mut EventStream<EventFileChooserOpened>,
    ) -> Result<bool> {
        self.click(control).await?;

        match tokio::time::timeout(wait, choosers.next()).await {
            Ok(Some(event)) => {
                let node = event
                    .backend_node_id
                    .clone()
                    .ok_or_else(|| anyhow!("File chooser has no backing input"))?;
                self.set_files(node, path).await?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(_) => {
                app_log!(
                    debug,
                    "No file chooser within {:?} after clicking {}",
                    wait,
                    control.describe()
                );
                Ok(false)
            }
        }
    }

    async fn intercept_file_chooser(&self, enabled: bool) -> Result<()> {
        self.session
            .page
            .execute(SetInterceptFileChooserDialogParams::new(enabled))
            .await
            .context("Failed to toggle file chooser interception")?;
        Ok(())
    }
}

#[async_trait]
impl FormSession for ChromeFormSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let page = &self.session.page;
        if let Err(e) = page.evaluate(MARK_STALE_SCRIPT).await {
            app_log!(debug, "Could not mark current document before navigating: {}", e);
        }

        let response = page
            .execute(NavigateParams::new(url))
            .await
            .context("Navigation command failed")?;
        if let Some(error) = &response.result.error_text {
            bail!("{}", error);
        }

        // Wait for DOM construction only; subresources may still be loading.
        loop {
            if let Ok(result) = page.evaluate(DOCUMENT_READY_SCRIPT).await {
                if result.into_value::<bool>().unwrap_or(false) {
                    return Ok(());
                }
            }
            tokio::time::sleep(READY_POLL).await;
        }
    }

    async fn controls(&mut self) -> Result<Vec<FormControl>> {
        let result = self
            .session
            .page
            .evaluate(INVENTORY_SCRIPT)
            .await
            .context("Inventory script failed")?;
        result
            .into_value::<Vec<FormControl>>()
            .context("Unexpected inventory payload")
    }

    async fn fill(&mut self, control: &FormControl, value: &str) -> Result<()> {
        let expression = format!(
            "({})({}, {})",
            FILL_FUNCTION,
            serde_json::to_string(&control.selector())?,
            serde_json::to_string(value)?
        );
        let result: FillResult = self
            .session
            .page
            .evaluate(expression)
            .await
            .context("Fill script failed")?
            .into_value()
            .context("Unexpected fill result")?;

        if result.ok {
            Ok(())
        } else {
            Err(anyhow!(result.reason.unwrap_or_else(|| "fill rejected".to_string())))
        }
    }

    async fn attach_file(&mut self, control: &FormControl, path: &Path) -> Result<()> {
        let node = self.backend_node(control).await?;
        self.set_files(node, path).await
    }

    async fn attach_via_chooser(
        &mut self,
        control: &FormControl,
        path: &Path,
        wait: Duration,
    ) -> Result<bool> {
        self.intercept_file_chooser(true).await?;
        let mut choosers = self
            .session
            .page
            .event_listener::<EventFileChooserOpened>()
            .await
            .context("Failed to listen for file choosers")?;

        let attempt = self.answer_chooser(control, path, wait, &mut choosers).await;

        if let Err(e) = self.intercept_file_chooser(false).await {
            app_log!(debug, "{:#}", e);
        }
        attempt
    }

    async fn click(&mut self, control: &FormControl) -> Result<()> {
        let element = self
            .session
            .page
            .find_element(control.selector())
            .await
            .with_context(|| format!("{} is no longer in the page", control.describe()))?;
        element
            .click()
            .await
            .with_context(|| format!("Click on {} failed", control.describe()))?;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.session
            .page
            .save_screenshot(params, path)
            .await
            .with_context(|| format!("Failed to save screenshot to {}", path.display()))?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        self.session
            .page
            .content()
            .await
            .context("Failed to read page content")
    }

    async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }
}
