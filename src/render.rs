// src/render.rs
//! HTML to PDF through a headless browser.

use anyhow::Context;
use std::time::Duration;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;

use crate::app_log;
use crate::browser::scripts::RENDER_SETTLE_FUNCTION;
use crate::browser::BrowserSession;
use crate::environment::{BrowserOptions, RenderConfig};
use crate::error::ApplyError;
use crate::form::ViewportSize;

// Extra time for the settle script to report back after its own bound.
const SETTLE_GRACE: Duration = Duration::from_secs(1);

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, ApplyError>;
}

/// Renders each document in its own browser, closed before returning.
#[derive(Debug, Clone)]
pub struct ChromePdfRenderer {
    browser: BrowserOptions,
    render: RenderConfig,
}

impl ChromePdfRenderer {
    pub fn new(browser: BrowserOptions, render: RenderConfig) -> Self {
        Self { browser, render }
    }

    fn print_params(&self) -> PrintToPdfParams {
        let (top, bottom, left, right) = self.render.margins_in();
        PrintToPdfParams {
            print_background: Some(self.render.print_background),
            paper_width: Some(self.render.paper_width_in),
            paper_height: Some(self.render.paper_height_in),
            margin_top: Some(top),
            margin_bottom: Some(bottom),
            margin_left: Some(left),
            margin_right: Some(right),
            ..PrintToPdfParams::default()
        }
    }

    fn settle_expression(&self) -> String {
        format!("({})({})", RENDER_SETTLE_FUNCTION, self.render.settle_timeout_ms)
    }

    /// Wait for linked resources and layout. Printing goes ahead once the bound
    /// is reached, with whatever has loaded by then.
    async fn settle(&self, session: &BrowserSession) -> anyhow::Result<()> {
        let limit = self.render.settle_timeout() + SETTLE_GRACE;
        let evaluation = session.page.evaluate(self.settle_expression());
        let settled = match tokio::time::timeout(limit, evaluation).await {
            Ok(result) => result
                .context("Settle script failed")?
                .into_value::<bool>()
                .unwrap_or(false),
            Err(_) => false,
        };

        if !settled {
            app_log!(
                warn,
                "Document resources still loading after {:?}, printing anyway",
                self.render.settle_timeout()
            );
        }
        Ok(())
    }

    async fn print(&self, session: &BrowserSession, html: &str) -> anyhow::Result<Vec<u8>> {
        session
            .page
            .set_content(html)
            .await
            .context("Failed to load document markup")?;
        self.settle(session).await?;
        session
            .page
            .pdf(self.print_params())
            .await
            .context("Print to PDF failed")
    }
}

#[async_trait]
impl DocumentRenderer for ChromePdfRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, ApplyError> {
        // A4 at 96 dpi
        let viewport = ViewportSize {
            width: 794,
            height: 1123,
        };
        let mut session = BrowserSession::launch(&self.browser, viewport)
            .await
            .map_err(|e| ApplyError::Render(format!("{:#}", e)))?;

        let result = self.print(&session, html).await;

        if let Err(e) = session.close().await {
            app_log!(warn, "Failed to close render session: {:#}", e);
        }

        let pdf = result.map_err(|e| ApplyError::Render(format!("{:#}", e)))?;
        app_log!(info, "Rendered PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }
}
