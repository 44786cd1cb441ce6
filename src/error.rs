// src/error.rs
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a whole application request.
///
/// Everything that can go wrong while filling a form after the page loaded is
/// a soft error and is reported through `StepReport` instead.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("template error: {0}")]
    Template(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("browser session error: {0}")]
    Session(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ApplyError {
    pub fn code(&self) -> &'static str {
        match self {
            ApplyError::Template(_) => "TEMPLATE_ERROR",
            ApplyError::Render(_) => "RENDER_ERROR",
            ApplyError::Session(_) => "SESSION_ERROR",
            ApplyError::Navigation { .. } => "NAVIGATION_ERROR",
            ApplyError::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
            ApplyError::Timeout(_) => "TIMEOUT",
            ApplyError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn storage(err: anyhow::Error) -> Self {
        ApplyError::Storage(format!("{:#}", err))
    }
}
