// src/form/testing.rs
//! Scripted stand-ins for the browser and the PDF backend.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::controls::FormControl;
use super::session::{FormSession, SessionLauncher, ViewportSize};
use super::snapshot::controls_from_html;
use crate::error::ApplyError;
use crate::render::DocumentRenderer;

pub const FULL_FORM: &str = r#"<html><head><title>Backend Engineer</title></head><body>
<h1>Backend Engineer</h1>
<form action="/public/ok.html" method="post">
  <label for="fn">Full Name</label><input id="fn" name="fullName">
  <label for="em">Email</label><input id="em" type="email" name="email">
  <label for="ph">Phone</label><input id="ph" type="tel" name="phone">
  <label for="cv">Resume</label><input id="cv" type="file" name="cv">
  <button type="submit">Submit application</button>
</form>
</body></html>"#;

pub const NO_FIELDS: &str = r#"<html><head><title>Careers</title></head><body>
<h1>We are hiring</h1>
<p>Drop us a line at jobs@example.com.</p>
</body></html>"#;

pub const CHOOSER_FORM: &str = r#"<html><body>
<form>
  <label>Your name <input name="n"></label>
  <label>Email address <input name="e" type="email"></label>
  <div class="dropzone"><button type="button">Upload CV</button></div>
  <button type="submit">Apply</button>
</form>
</body></html>"#;

pub const NO_UPLOAD_FORM: &str = r#"<html><body>
<form>
  <input aria-label="Name">
  <input aria-label="Email">
  <input aria-label="Mobile">
  <button>Send</button>
</form>
</body></html>"#;

#[derive(Debug, Clone, Default)]
pub struct FakeBehaviour {
    pub html: String,
    pub fail_launch: bool,
    pub hang_on_navigate: bool,
    pub navigate_error: Option<String>,
    /// Whether clicking an upload invitation opens a file chooser.
    pub chooser_opens: bool,
    /// Labels whose fill is rejected by the page.
    pub reject_fill: Vec<String>,
    pub fail_screenshot: bool,
    /// Page shown after a button is clicked.
    pub html_after_click: Option<String>,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub launched: usize,
    pub closed: usize,
    pub viewport: Option<ViewportSize>,
    pub navigated: Vec<String>,
    pub fills: Vec<(String, String)>,
    pub attachments: Vec<(String, PathBuf)>,
    pub chooser_attachments: Vec<PathBuf>,
    pub clicks: Vec<String>,
    pub screenshots: Vec<PathBuf>,
}

#[derive(Clone)]
pub struct FakeLauncher {
    behaviour: FakeBehaviour,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeLauncher {
    pub fn new(behaviour: FakeBehaviour) -> Self {
        Self {
            behaviour,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn serving(html: &str) -> Self {
        Self::new(FakeBehaviour {
            html: html.to_string(),
            ..FakeBehaviour::default()
        })
    }

    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self, viewport: ViewportSize) -> Result<Box<dyn FormSession>, ApplyError> {
        if self.behaviour.fail_launch {
            return Err(ApplyError::Session("no browser available".to_string()));
        }

        {
            let mut recorded = self.recorded();
            recorded.launched += 1;
            recorded.viewport = Some(viewport);
        }

        Ok(Box::new(FakeSession {
            behaviour: self.behaviour.clone(),
            recorded: Arc::clone(&self.recorded),
            html: String::new(),
        }))
    }
}

pub struct FakeSession {
    behaviour: FakeBehaviour,
    recorded: Arc<Mutex<Recorded>>,
    html: String,
}

impl FakeSession {
    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

fn caption(control: &FormControl) -> String {
    control
        .label
        .clone()
        .or_else(|| control.name.clone())
        .unwrap_or_else(|| control.describe())
}

#[async_trait]
impl FormSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.recorded().navigated.push(url.to_string());
        if self.behaviour.hang_on_navigate {
            futures::future::pending::<()>().await;
        }
        if let Some(reason) = &self.behaviour.navigate_error {
            bail!("{}", reason);
        }
        self.html = self.behaviour.html.clone();
        Ok(())
    }

    async fn controls(&mut self) -> Result<Vec<FormControl>> {
        Ok(controls_from_html(&self.html))
    }

    async fn fill(&mut self, control: &FormControl, value: &str) -> Result<()> {
        let label = caption(control);
        if self.behaviour.reject_fill.contains(&label) {
            bail!("element is not editable");
        }
        self.recorded().fills.push((label, value.to_string()));
        Ok(())
    }

    async fn attach_file(&mut self, control: &FormControl, path: &Path) -> Result<()> {
        if !control.file_input {
            bail!("{} is not a file input", control.describe());
        }
        self.recorded()
            .attachments
            .push((caption(control), path.to_path_buf()));
        Ok(())
    }

    async fn attach_via_chooser(
        &mut self,
        control: &FormControl,
        path: &Path,
        wait: Duration,
    ) -> Result<bool> {
        self.recorded().clicks.push(caption(control));
        if self.behaviour.chooser_opens {
            self.recorded().chooser_attachments.push(path.to_path_buf());
            Ok(true)
        } else {
            tokio::time::sleep(wait).await;
            Ok(false)
        }
    }

    async fn click(&mut self, control: &FormControl) -> Result<()> {
        self.recorded().clicks.push(caption(control));
        if let Some(next) = &self.behaviour.html_after_click {
            self.html = next.clone();
        }
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        if self.behaviour.fail_screenshot {
            bail!("screenshot timed out");
        }
        tokio::fs::write(path, b"\x89PNG\r\n\x1a\nfake").await?;
        self.recorded().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.html.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.recorded().closed += 1;
        Ok(())
    }
}

/// Renderer that returns a tiny PDF carrying the bound markup.
#[derive(Debug, Default)]
pub struct StubRenderer {
    pub fail: bool,
    pub empty: bool,
}

#[async_trait]
impl DocumentRenderer for StubRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, ApplyError> {
        if self.fail {
            return Err(ApplyError::Render("backend crashed".to_string()));
        }
        if self.empty {
            return Ok(Vec::new());
        }
        let mut pdf = b"%PDF-1.7\n".to_vec();
        pdf.extend_from_slice(html.as_bytes());
        Ok(pdf)
    }
}
