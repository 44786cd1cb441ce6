// src/form/engine.rs
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

use super::controls::{file_input, fill_target, submit_control, upload_invitation};
use super::fields::{InteractionPatterns, LabelRule};
use super::session::{FormSession, SessionLauncher, ViewportSize};
use super::steps::{Step, StepLog, StepStatus};
use crate::core::FsOps;
use crate::environment::{AppConfig, EngineConfig};
use crate::error::ApplyError;
use crate::types::profile::Profile;
use crate::types::response::SubmissionOutcome;
use crate::utils::{artifact_stamp, truncate_chars};
use crate::{app_log, app_span};

/// What to submit, and where.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionTarget<'a> {
    pub url: &'a str,
    pub profile: &'a Profile,
    pub document_path: &'a Path,
}

/// Drives one browser session through fill, upload, submit and proof capture.
///
/// Only session start-up and the initial navigation can fail the call. Every
/// later step is attempted, recorded in the outcome and then left behind.
pub struct FormEngine {
    launcher: Arc<dyn SessionLauncher>,
    patterns: InteractionPatterns,
    config: EngineConfig,
    proofs_dir: PathBuf,
}

impl FormEngine {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        patterns: InteractionPatterns,
        config: EngineConfig,
        proofs_dir: PathBuf,
    ) -> Self {
        Self {
            launcher,
            patterns,
            config,
            proofs_dir,
        }
    }

    pub fn from_config(launcher: Arc<dyn SessionLauncher>, config: &AppConfig) -> Result<Self> {
        let patterns = InteractionPatterns::from_config(&config.engine)
            .context("Invalid interaction patterns in engine configuration")?;
        Ok(Self::new(
            launcher,
            patterns,
            config.engine.clone(),
            config.storage.proofs_dir(),
        ))
    }

    pub fn patterns(&self) -> &InteractionPatterns {
        &self.patterns
    }

    pub async fn submit(&self, target: SubmissionTarget<'_>) -> Result<SubmissionOutcome, ApplyError> {
        let span = app_span!("form_submission", url = %target.url);

        async move {
            let viewport = ViewportSize {
                width: self.config.viewport_width,
                height: self.config.viewport_height,
            };
            let mut session = self.launcher.launch(viewport).await?;
            app_log!(info, "Browser session started for {}", target.url);

            let result = self.drive(session.as_mut(), &target).await;

            if let Err(e) = session.close().await {
                app_log!(warn, "Failed to close browser session: {:#}", e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        session: &mut dyn FormSession,
        target: &SubmissionTarget<'_>,
    ) -> Result<SubmissionOutcome, ApplyError> {
        self.navigate(session, target.url).await?;

        let mut log = StepLog::new();

        for rule in self.patterns.fields.rules() {
            let result = self.fill_field(session, rule, target.profile).await;
            log.record(Step::Fill(rule.field), result);
        }

        let result = self.attach_document(session, target.document_path).await;
        log.record(Step::Upload, result);

        let result = self.click_submit(session).await;
        log.record(Step::Submit, result);

        tokio::time::sleep(self.config.settle()).await;

        let proof_path = self
            .proofs_dir
            .join(format!("proof_{}.png", artifact_stamp(Utc::now())));
        let result = self.capture_proof(session, &proof_path).await;
        let captured = log.record(Step::CaptureProof, result);

        let html_snippet = match session.content().await {
            Ok(html) => {
                let snippet = truncate_chars(&html, self.config.snippet_chars);
                log.record(
                    Step::Snapshot,
                    Ok(StepStatus::Completed(format!(
                        "{} of {} characters kept",
                        snippet.chars().count(),
                        html.chars().count()
                    ))),
                );
                snippet
            }
            Err(e) => {
                log.record(Step::Snapshot, Err(e));
                String::new()
            }
        };

        let proof_on_disk = captured && tokio::fs::try_exists(&proof_path).await.unwrap_or(false);
        let error = if proof_on_disk {
            None
        } else {
            let reason = match log.status_of(Step::CaptureProof) {
                Some(StepStatus::Failed(reason)) => reason.clone(),
                _ => "screenshot missing after capture".to_string(),
            };
            Some(format!("proof capture failed: {}", reason))
        };

        Ok(SubmissionOutcome {
            success: proof_on_disk,
            proof_path: proof_on_disk.then_some(proof_path),
            html_snippet,
            error,
            steps: log.into_reports(),
        })
    }

    async fn navigate(&self, session: &mut dyn FormSession, url: &str) -> Result<(), ApplyError> {
        let limit = self.config.navigation_timeout();

        match tokio::time::timeout(limit, session.navigate(url)).await {
            Ok(Ok(())) => {
                app_log!(info, "Page loaded: {}", url);
                Ok(())
            }
            Ok(Err(e)) => Err(ApplyError::Navigation {
                url: url.to_string(),
                reason: format!("{:#}", e),
            }),
            Err(_) => Err(ApplyError::Navigation {
                url: url.to_string(),
                reason: format!("page did not load within {:?}", limit),
            }),
        }
    }

    async fn fill_field(
        &self,
        session: &mut dyn FormSession,
        rule: &LabelRule,
        profile: &Profile,
    ) -> Result<StepStatus> {
        let Some(value) = rule.field.value(profile).filter(|v| !v.trim().is_empty()) else {
            return Ok(StepStatus::Skipped(format!("profile has no {}", rule.field)));
        };

        let controls = session.controls().await?;
        let Some(control) = fill_target(&controls, rule) else {
            return Ok(StepStatus::Skipped(format!(
                "no visible control labelled /{}/",
                rule.pattern()
            )));
        };

        session
            .fill(control, value)
            .await
            .with_context(|| format!("Fill rejected by {}", control.describe()))?;
        Ok(StepStatus::Completed(control.describe()))
    }

    /// Native file input first, then a control that opens a file chooser.
    async fn attach_document(&self, session: &mut dyn FormSession, document: &Path) -> Result<StepStatus> {
        let controls = session.controls().await?;

        if let Some(input) = file_input(&controls) {
            session
                .attach_file(input, document)
                .await
                .with_context(|| format!("Could not set file on {}", input.describe()))?;
            return Ok(StepStatus::Completed(format!("file input {}", input.describe())));
        }

        let Some(invitation) = upload_invitation(&controls, &self.patterns.upload_invitation) else {
            return Ok(StepStatus::Skipped(
                "no file input and no upload control".to_string(),
            ));
        };

        let wait = self.config.file_chooser_wait();
        if session.attach_via_chooser(invitation, document, wait).await? {
            Ok(StepStatus::Completed(format!(
                "file chooser opened by {}",
                invitation.describe()
            )))
        } else {
            Ok(StepStatus::Skipped(format!(
                "{} opened no file chooser within {:?}",
                invitation.describe(),
                wait
            )))
        }
    }

    async fn click_submit(&self, session: &mut dyn FormSession) -> Result<StepStatus> {
        let controls = session.controls().await?;
        let Some(control) = submit_control(&controls, &self.patterns.submit_intent) else {
            return Ok(StepStatus::Skipped("no submit control".to_string()));
        };

        session.click(control).await?;
        Ok(StepStatus::Completed(control.describe()))
    }

    async fn capture_proof(&self, session: &mut dyn FormSession, path: &Path) -> Result<StepStatus> {
        FsOps::ensure_dir_exists(&self.proofs_dir).await?;
        session.screenshot(path).await?;
        Ok(StepStatus::Completed(path.display().to_string()))
    }
}
