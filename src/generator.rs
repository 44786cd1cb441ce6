// src/generator.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_log;
use crate::core::{FsOps, TemplateEngine};
use crate::environment::AppConfig;
use crate::error::ApplyError;
use crate::render::DocumentRenderer;
use crate::types::profile::Profile;
use crate::types::response::Document;
use crate::utils::{artifact_stamp, filename_token};

/// Binds a profile into the CV template and renders it to a PDF on disk.
///
/// Every call writes a new file; nothing is cached between requests.
pub struct DocumentGenerator {
    templates: TemplateEngine,
    template_id: String,
    renderer: Arc<dyn DocumentRenderer>,
    documents_dir: PathBuf,
}

impl DocumentGenerator {
    pub fn new(
        templates: TemplateEngine,
        template_id: impl Into<String>,
        renderer: Arc<dyn DocumentRenderer>,
        documents_dir: PathBuf,
    ) -> Self {
        Self {
            templates,
            template_id: template_id.into(),
            renderer,
            documents_dir,
        }
    }

    pub fn from_config(config: &AppConfig, renderer: Arc<dyn DocumentRenderer>) -> Result<Self> {
        let templates = TemplateEngine::new(config.storage.templates_dir())
            .context("Failed to initialize template engine")?;

        Ok(Self::new(
            templates,
            config.render.template.clone(),
            renderer,
            config.storage.documents_dir(),
        ))
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    pub async fn generate(&self, profile: &Profile, target_role: &str) -> Result<Document, ApplyError> {
        let template = self.templates.load(&self.template_id).await?;

        let resume = serde_json::to_value(profile)
            .map_err(|e| ApplyError::Template(format!("profile is not serializable: {}", e)))?;
        let markup = template.render(&json!({
            "resume": resume,
            "targetRole": target_role,
        }))?;

        let pdf = self.renderer.render_pdf(&markup).await?;
        if pdf.is_empty() {
            return Err(ApplyError::Render("backend produced an empty document".to_string()));
        }

        let created_at = Utc::now();
        let path = self
            .documents_dir
            .join(Self::document_name(profile, target_role, created_at));

        FsOps::write_new_file(&path, &pdf)
            .await
            .map_err(ApplyError::storage)?;

        app_log!(
            info,
            "Generated CV for {} ({} role) to {}",
            profile.full_name,
            target_role,
            path.display()
        );

        Ok(Document { path, created_at })
    }

    fn document_name(profile: &Profile, target_role: &str, now: DateTime<Utc>) -> String {
        format!(
            "{}_{}_{}.pdf",
            filename_token(&profile.full_name),
            filename_token(target_role),
            artifact_stamp(now)
        )
    }
}
