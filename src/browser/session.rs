// src/browser/session.rs
use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Handler, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::app_log;
use crate::environment::BrowserOptions;
use crate::form::ViewportSize;

/// One headless browser process with a single working page.
pub struct BrowserSession {
    browser: Browser,
    pub page: Page,
    handler_task: JoinHandle<()>,
    closed: bool,
}

impl BrowserSession {
    pub async fn launch(options: &BrowserOptions, viewport: ViewportSize) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(viewport.width, viewport.height)
            .viewport(Viewport {
                width: viewport.width,
                height: viewport.height,
                ..Viewport::default()
            })
            .launch_timeout(Duration::from_secs(options.launch_timeout_secs));

        if options.no_sandbox {
            builder = builder.no_sandbox();
        }
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("Invalid browser configuration: {}", e))?;

        let (mut browser, handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;
        let handler_task = spawn_handler_task(handler);

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(anyhow!("Failed to open page: {}", e));
            }
        };

        app_log!(debug, "Browser session ready ({}x{})", viewport.width, viewport.height);
        Ok(Self {
            browser,
            page,
            handler_task,
            closed: false,
        })
    }

    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closing = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();

        closing.context("Failed to close browser")?;
        app_log!(debug, "Browser session closed");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // The child process is spawned kill-on-drop, so dropping `browser` ends it.
        if !self.closed {
            app_log!(warn, "Browser session dropped without close");
        }
        self.handler_task.abort();
    }
}

fn spawn_handler_task(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                app_log!(debug, "Browser handler event error: {}", e);
            }
        }
    })
}
