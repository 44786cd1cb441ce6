// src/profile_store.rs
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::app_log;
use crate::core::FsOps;
use crate::environment::{AppConfig, MissingProfile};
use crate::error::ApplyError;
use crate::types::profile::Profile;
use crate::utils::normalize_profile_id;

/// Read-only access to `<profiles_dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles_dir: PathBuf,
    on_missing: MissingProfile,
}

impl ProfileStore {
    pub fn new(profiles_dir: PathBuf, on_missing: MissingProfile) -> Self {
        Self {
            profiles_dir,
            on_missing,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.storage.profiles_dir(), config.profiles.on_missing)
    }

    pub fn path_for(&self, profile_id: &str) -> PathBuf {
        self.profiles_dir
            .join(format!("{}.json", normalize_profile_id(profile_id)))
    }

    pub async fn load(&self, profile_id: &str) -> Result<Profile, ApplyError> {
        match self.read(profile_id).await {
            Ok(profile) => Ok(profile),
            Err(e) => match self.on_missing {
                MissingProfile::Default => {
                    app_log!(
                        warn,
                        "Profile '{}' unavailable, using placeholder: {:#}",
                        profile_id,
                        e
                    );
                    Ok(Profile::placeholder())
                }
                MissingProfile::Reject => Err(ApplyError::ProfileNotFound(profile_id.to_string())),
            },
        }
    }

    async fn read(&self, profile_id: &str) -> Result<Profile> {
        let path = self.path_for(profile_id);
        let content = FsOps::read_file_safe(&path).await?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse profile: {}", path.display()))
    }

    /// Ids of every stored profile.
    pub async fn list(&self) -> Result<Vec<String>> {
        FsOps::list_stems(&self.profiles_dir, "json").await
    }
}
