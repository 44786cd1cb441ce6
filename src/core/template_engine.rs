// src/core/template_engine.rs
//! CV template discovery, and compilation through Handlebars.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::app_log;
use crate::core::FsOps;
use crate::error::ApplyError;

const DEFAULT_TEMPLATE: &str = "modern";
const DEFAULT_MAIN_FILE: &str = "cv.html";
const COMPILED_NAME: &str = "cv";

// ===== Template Models =====

#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub id: String,
    pub path: PathBuf,
    pub manifest: TemplateManifest,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TemplateManifest {
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub main_file: Option<String>,
}

impl TemplateInfo {
    pub fn main_file(&self) -> PathBuf {
        self.path.join(
            self.manifest
                .main_file
                .as_deref()
                .unwrap_or(DEFAULT_MAIN_FILE),
        )
    }
}

// ===== Main Template Engine =====

pub struct TemplateEngine {
    templates_dir: PathBuf,
    templates: Vec<TemplateInfo>,
}

impl TemplateEngine {
    /// Create new template engine with automatic discovery
    pub fn new(templates_dir: PathBuf) -> Result<Self> {
        let mut engine = Self {
            templates_dir,
            templates: Vec::new(),
        };
        engine.discover_templates()?;
        Ok(engine)
    }

    fn discover_templates(&mut self) -> Result<()> {
        self.templates.clear();

        if !self.templates_dir.exists() {
            app_log!(
                warn,
                "Templates directory does not exist: {}",
                self.templates_dir.display()
            );
            return Ok(());
        }

        let entries = std::fs::read_dir(&self.templates_dir).with_context(|| {
            format!(
                "Failed to read templates directory: {}",
                self.templates_dir.display()
            )
        })?;

        for entry in entries {
            let path = entry?.path();

            if path.is_dir() {
                if let Some(template_name) = path.file_name().and_then(|n| n.to_str()) {
                    match self.load_template_info(template_name, &path) {
                        Ok(template) => {
                            app_log!(
                                trace,
                                "Loaded template: {} from {}",
                                template.id,
                                template.path.display()
                            );
                            self.templates.push(template);
                        }
                        Err(e) => {
                            app_log!(warn, "Failed to load template {}: {}", template_name, e)
                        }
                    }
                }
            }
        }

        self.templates.sort_by(|a, b| a.id.cmp(&b.id));
        app_log!(info, "Discovered {} templates", self.templates.len());
        Ok(())
    }

    fn load_template_info(&self, template_id: &str, template_path: &Path) -> Result<TemplateInfo> {
        let manifest_path = template_path.join("manifest.toml");

        let manifest = if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path)
                .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?
        } else {
            TemplateManifest {
                name: template_id.to_string(),
                description: None,
                author: None,
                version: None,
                main_file: None,
            }
        };

        Ok(TemplateInfo {
            id: template_id.to_string(),
            path: template_path.to_path_buf(),
            manifest,
        })
    }

    pub fn list_templates(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.id.clone()).collect()
    }

    pub fn get_template(&self, template_id: &str) -> Option<&TemplateInfo> {
        self.templates.iter().find(|t| t.id == template_id)
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Case-insensitive match on the requested id, then `modern`, then whatever
    /// was discovered first.
    pub fn resolve_template(&self, requested: &str) -> Option<&TemplateInfo> {
        let requested = requested.to_lowercase();
        self.templates
            .iter()
            .find(|t| t.id.to_lowercase() == requested)
            .or_else(|| self.get_template(DEFAULT_TEMPLATE))
            .or_else(|| self.templates.first())
    }

    /// Read and compile a template's main file.
    pub async fn load(&self, requested: &str) -> Result<CompiledTemplate, ApplyError> {
        let template = self.resolve_template(requested).ok_or_else(|| {
            ApplyError::Template(format!(
                "no template available in {}",
                self.templates_dir.display()
            ))
        })?;

        if template.id != requested {
            app_log!(
                warn,
                "Template '{}' not found, using '{}'",
                requested,
                template.id
            );
        }

        let source = FsOps::read_file_safe(&template.main_file())
            .await
            .map_err(|e| ApplyError::Template(format!("{:#}", e)))?;

        CompiledTemplate::compile(&source).map_err(|e| match e {
            ApplyError::Template(reason) => {
                ApplyError::Template(format!("{} in template '{}'", reason, template.id))
            }
            other => other,
        })
    }
}

// ===== Compiled Template =====

/// A parsed template, ready to be bound to a JSON context.
pub struct CompiledTemplate {
    registry: Handlebars<'static>,
}

impl CompiledTemplate {
    pub fn compile(source: &str) -> Result<Self, ApplyError> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(COMPILED_NAME, source)
            .map_err(|e| ApplyError::Template(e.to_string()))?;
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, context: &T) -> Result<String, ApplyError> {
        self.registry
            .render(COMPILED_NAME, context)
            .map_err(|e| ApplyError::Render(format!("template binding failed: {}", e)))
    }
}
