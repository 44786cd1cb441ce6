// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::FsOps;
use crate::form::fields::ProfileField;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub engine: EngineConfig,
    pub render: RenderConfig,
    pub browser: BrowserOptions,
    pub profiles: ProfilePolicy,
    pub server: ServerSettings,
}

/// Every directory the worker writes into. Derived from one data directory
/// unless a path is set explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub profiles_dir: Option<PathBuf>,
    #[serde(default)]
    pub documents_dir: Option<PathBuf>,
    #[serde(default)]
    pub proofs_dir: Option<PathBuf>,
    #[serde(default)]
    pub logs_dir: Option<PathBuf>,
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout_secs: u64,
    /// How long a click on an upload invitation may take to open a file chooser.
    pub file_chooser_wait_ms: u64,
    pub settle_ms: u64,
    pub snippet_chars: usize,
    /// Replaces the built-in label table when set.
    pub field_rules: Option<Vec<FieldRuleConfig>>,
    pub upload_pattern: Option<String>,
    pub submit_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRuleConfig {
    pub field: ProfileField,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub template: String,
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub margin_top_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    pub margin_right_mm: f64,
    pub print_background: bool,
    /// Upper bound on waiting for linked images, stylesheets and fonts before printing.
    pub settle_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub no_sandbox: bool,
    pub launch_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProfile {
    /// Substitute the built-in placeholder profile.
    Default,
    /// Fail the request with `ProfileNotFound`.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePolicy {
    pub on_missing: MissingProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: Option<AppConfig>,
    production: Option<AppConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_data_dir(PathBuf::from("data"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::under(PathBuf::from("data"))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1366,
            viewport_height: 768,
            navigation_timeout_secs: 60,
            file_chooser_wait_ms: 3000,
            settle_ms: 1500,
            snippet_chars: 1000,
            field_rules: None,
            upload_pattern: None,
            submit_pattern: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        // A4 with 20mm top/bottom and 15mm side margins
        Self {
            template: "modern".to_string(),
            paper_width_in: 8.27,
            paper_height_in: 11.69,
            margin_top_mm: 20.0,
            margin_bottom_mm: 20.0,
            margin_left_mm: 15.0,
            margin_right_mm: 15.0,
            print_background: true,
            settle_timeout_ms: 10_000,
        }
    }
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            no_sandbox: true,
            launch_timeout_secs: 30,
        }
    }
}

impl Default for ProfilePolicy {
    fn default() -> Self {
        Self {
            on_missing: MissingProfile::Default,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            request_timeout_secs: 180,
        }
    }
}

impl AppConfig {
    /// Load configuration for the current environment: `config.yaml` when present,
    /// defaults relative to the working directory otherwise.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = PathBuf::from(CONFIG_FILE);
        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path, &environment)?
        } else {
            info!("{} not found, using defaults", CONFIG_FILE);
            let base_dir = if environment == "production" {
                PathBuf::from("/app")
            } else {
                std::env::current_dir().context("Failed to get current directory")?
            };
            Self::with_data_dir(base_dir.join("data"))
        };

        if let Ok(data_dir) = std::env::var("APPLY_DATA_DIR") {
            config.storage = StorageConfig::under(PathBuf::from(data_dir));
        }

        if let Some(port) = ["PORT_WORKER", "PORT"]
            .iter()
            .find_map(|var| std::env::var(var).ok())
        {
            config.server.port = port
                .parse()
                .with_context(|| format!("Invalid port number: {}", port))?;
        }

        config.storage = config.storage.resolved()?;
        Ok(config)
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            storage: StorageConfig::under(data_dir),
            engine: EngineConfig::default(),
            render: RenderConfig::default(),
            browser: BrowserOptions::default(),
            profiles: ProfilePolicy::default(),
            server: ServerSettings::default(),
        }
    }

    fn get_environment() -> String {
        std::env::var("APPLY_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };
        section.with_context(|| format!("No '{}' section in configuration", environment))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Create every storage area; the worker never removes anything from them.
    pub async fn ensure_directories(&self) -> Result<()> {
        for dir in [
            self.storage.profiles_dir(),
            self.storage.documents_dir(),
            self.storage.proofs_dir(),
            self.storage.logs_dir(),
        ] {
            FsOps::ensure_dir_exists(&dir).await?;
        }

        info!("All configured directories ensured to exist");
        Ok(())
    }
}

impl StorageConfig {
    pub fn under(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            profiles_dir: None,
            documents_dir: None,
            proofs_dir: None,
            logs_dir: None,
            templates_dir: None,
        }
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.profiles_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("profile"))
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.documents_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("cv"))
    }

    pub fn proofs_dir(&self) -> PathBuf {
        self.proofs_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("proofs"))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.logs_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("templates"))
    }

    pub fn error_log(&self) -> PathBuf {
        self.logs_dir().join("error.log")
    }

    /// Make every configured path absolute against the working directory.
    fn resolved(self) -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        let resolve = |p: PathBuf| FsOps::normalize_path(&current_dir, &p);

        Ok(Self {
            data_dir: resolve(self.data_dir),
            profiles_dir: self.profiles_dir.map(resolve),
            documents_dir: self.documents_dir.map(resolve),
            proofs_dir: self.proofs_dir.map(resolve),
            logs_dir: self.logs_dir.map(resolve),
            templates_dir: Some(resolve(
                self.templates_dir
                    .unwrap_or_else(|| PathBuf::from("templates")),
            )),
        })
    }
}

impl EngineConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn file_chooser_wait(&self) -> Duration {
        Duration::from_millis(self.file_chooser_wait_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl RenderConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    fn mm_to_inches(mm: f64) -> f64 {
        mm / 25.4
    }

    /// Margins in inches, ordered top, bottom, left, right.
    pub fn margins_in(&self) -> (f64, f64, f64, f64) {
        (
            Self::mm_to_inches(self.margin_top_mm),
            Self::mm_to_inches(self.margin_bottom_mm),
            Self::mm_to_inches(self.margin_left_mm),
            Self::mm_to_inches(self.margin_right_mm),
        )
    }
}
