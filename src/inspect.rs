// src/inspect.rs
//! Dry run: fetch a form page without a browser and report what the engine
//! would fill, upload into and click.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::form::controls::{file_input, fill_target, submit_control, upload_invitation};
use crate::form::snapshot::controls_from_html;
use crate::form::{FormControl, InteractionPatterns, ProfileField};

#[derive(Debug, Clone, Serialize)]
pub struct PlannedField {
    pub field: ProfileField,
    pub pattern: String,
    pub control: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum UploadPlan {
    FileInput { control: String },
    Chooser { control: String },
    None,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPlan {
    pub fields: Vec<PlannedField>,
    pub upload: UploadPlan,
    pub submit: Option<String>,
    pub controls_seen: usize,
}

impl FormPlan {
    pub fn build(controls: &[FormControl], patterns: &InteractionPatterns) -> Self {
        let fields = patterns
            .fields
            .rules()
            .iter()
            .map(|rule| PlannedField {
                field: rule.field,
                pattern: rule.pattern().to_string(),
                control: fill_target(controls, rule).map(FormControl::describe),
            })
            .collect();

        let upload = match file_input(controls) {
            Some(input) => UploadPlan::FileInput {
                control: input.describe(),
            },
            None => match upload_invitation(controls, &patterns.upload_invitation) {
                Some(invitation) => UploadPlan::Chooser {
                    control: invitation.describe(),
                },
                None => UploadPlan::None,
            },
        };

        Self {
            fields,
            upload,
            submit: submit_control(controls, &patterns.submit_intent).map(FormControl::describe),
            controls_seen: controls.len(),
        }
    }
}

/// Static fetch, so layout-only hiding and script-built forms are not seen.
pub struct FormInspector {
    client: Client,
    patterns: InteractionPatterns,
}

impl FormInspector {
    pub fn new(patterns: InteractionPatterns) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, patterns })
    }

    pub async fn inspect(&self, url: &str) -> Result<FormPlan> {
        info!("Inspecting form: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch form page")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(self.plan_for(&html))
    }

    pub fn plan_for(&self, html: &str) -> FormPlan {
        let controls = controls_from_html(html);
        let plan = FormPlan::build(&controls, &self.patterns);
        info!(
            "Form plan: {}/{} fields matched, upload {:?}, submit {:?}",
            plan.fields.iter().filter(|f| f.control.is_some()).count(),
            plan.fields.len(),
            plan.upload,
            plan.submit
        );
        plan
    }
}
