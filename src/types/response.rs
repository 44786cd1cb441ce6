// src/types/response.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::form::steps::StepReport;

pub const DEFAULT_PROFILE_ID: &str = "default";
pub const DEFAULT_TARGET_ROLE: &str = "General Role";

/// A rendered CV on disk.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Result of one submission attempt. Built once, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub proof_path: Option<PathBuf>,
    pub html_snippet: String,
    pub error: Option<String>,
    pub steps: Vec<StepReport>,
}

impl SubmissionOutcome {
    /// Steps that did what they set out to do.
    pub fn completed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.is_completed())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    pub url: String,
    #[serde(default = "default_profile_id")]
    pub profile_id: String,
    #[serde(default = "default_target_role")]
    pub target_role: String,
    /// Accepted for compatibility with the job-board API, not used for tailoring yet.
    #[serde(default)]
    pub jd_text: Option<String>,
}

fn default_profile_id() -> String {
    DEFAULT_PROFILE_ID.to_string()
}

fn default_target_role() -> String {
    DEFAULT_TARGET_ROLE.to_string()
}

impl ApplyRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            profile_id: default_profile_id(),
            target_role: default_target_role(),
            jd_text: None,
        }
    }

    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = profile_id.into();
        self
    }

    pub fn with_role(mut self, target_role: impl Into<String>) -> Self {
        self.target_role = target_role.into();
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepReport>,
}

impl ApplyResponse {
    pub fn from_outcome(document: &Document, outcome: SubmissionOutcome) -> Self {
        Self {
            ok: outcome.success,
            pdf_path: Some(document.path.display().to_string()),
            proof: outcome.proof_path.map(|p| p.display().to_string()),
            html_snippet: Some(outcome.html_snippet),
            error: outcome.error,
            error_code: None,
            steps: outcome.steps,
        }
    }

    pub fn failure(error: &crate::ApplyError) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            error_code: Some(error.code().to_string()),
            ..Self::default()
        }
    }
}
