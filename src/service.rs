// src/service.rs
//! The caller-facing boundary: profile, document, submission, in that order.

use anyhow::Result;
use chrono::Utc;
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::browser::ChromeLauncher;
use crate::core::FsOps;
use crate::environment::AppConfig;
use crate::error::ApplyError;
use crate::form::{FormEngine, SessionLauncher, SubmissionTarget};
use crate::generator::DocumentGenerator;
use crate::profile_store::ProfileStore;
use crate::render::{ChromePdfRenderer, DocumentRenderer};
use crate::types::response::{ApplyRequest, ApplyResponse};
use crate::{app_log, app_span};

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

pub struct ApplicationService {
    profiles: ProfileStore,
    generator: DocumentGenerator,
    engine: FormEngine,
    error_log: PathBuf,
    request_timeout: Duration,
}

impl ApplicationService {
    pub fn new(
        profiles: ProfileStore,
        generator: DocumentGenerator,
        engine: FormEngine,
        error_log: PathBuf,
        request_timeout: Duration,
    ) -> Self {
        Self {
            profiles,
            generator,
            engine,
            error_log,
            request_timeout,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        launcher: Arc<dyn SessionLauncher>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Result<Self> {
        Ok(Self::new(
            ProfileStore::from_config(config),
            DocumentGenerator::from_config(config, renderer)?,
            FormEngine::from_config(launcher, config)?,
            config.storage.error_log(),
            config.request_timeout(),
        ))
    }

    /// Wired to a local Chromium for both rendering and form interaction.
    pub fn chrome(config: &AppConfig) -> Result<Self> {
        Self::from_config(
            config,
            Arc::new(ChromeLauncher::new(config.browser.clone())),
            Arc::new(ChromePdfRenderer::new(
                config.browser.clone(),
                config.render.clone(),
            )),
        )
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn generator(&self) -> &DocumentGenerator {
        &self.generator
    }

    /// Run one application. Fatal errors are logged to the error log and
    /// turned into a failed response; this never returns an `Err`.
    pub async fn apply(&self, request: &ApplyRequest) -> ApplyResponse {
        let span = app_span!(
            "apply_request",
            url = %request.url,
            profile = %request.profile_id,
            role = %request.target_role
        );

        async {
            if request.jd_text.is_some() {
                app_log!(debug, "Job description supplied, not used for tailoring");
            }

            let result = match tokio::time::timeout(self.request_timeout, self.run(request)).await {
                Ok(result) => result,
                Err(_) => Err(ApplyError::Timeout(self.request_timeout)),
            };

            match result {
                Ok(response) => response,
                Err(e) => self.fail(&e).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &ApplyRequest) -> Result<ApplyResponse, ApplyError> {
        Self::validate_url(&request.url)?;

        let profile = self.profiles.load(&request.profile_id).await?;
        let document = self.generator.generate(&profile, &request.target_role).await?;

        let outcome = self
            .engine
            .submit(SubmissionTarget {
                url: &request.url,
                profile: &profile,
                document_path: &document.path,
            })
            .await?;

        app_log!(
            info,
            "Submission finished: success={} proof={:?} steps_completed={}",
            outcome.success,
            outcome.proof_path,
            outcome.completed_steps().count()
        );

        Ok(ApplyResponse::from_outcome(&document, outcome))
    }

    fn validate_url(url: &str) -> Result<(), ApplyError> {
        let navigation_error = |reason: String| ApplyError::Navigation {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| navigation_error(format!("invalid URL: {}", e)))?;
        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(navigation_error(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(())
    }

    async fn fail(&self, error: &ApplyError) -> ApplyResponse {
        app_log!(error, "Application failed: {}", error);

        let line = format!("{} [{}] {}", Utc::now().to_rfc3339(), error.code(), error);
        if let Err(e) = FsOps::append_line(&self.error_log, &line).await {
            app_log!(error, "Failed to write error log: {:#}", e);
        }

        ApplyResponse::failure(error)
    }
}
