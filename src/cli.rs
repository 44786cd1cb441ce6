// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::app_log;
use crate::environment::AppConfig;
use crate::form::InteractionPatterns;
use crate::generator::DocumentGenerator;
use crate::inspect::FormInspector;
use crate::profile_store::ProfileStore;
use crate::render::ChromePdfRenderer;
use crate::service::ApplicationService;
use crate::types::response::{ApplyRequest, DEFAULT_PROFILE_ID, DEFAULT_TARGET_ROLE};
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "apply-agent")]
#[command(about = "Render a CV and submit it through an unknown job application form")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the HTTP worker (default)
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate a CV and submit it to one form
    Apply {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = DEFAULT_PROFILE_ID)]
        profile: String,
        #[arg(long, default_value = DEFAULT_TARGET_ROLE)]
        role: String,
    },
    /// Generate a CV without submitting anything
    Render {
        #[arg(long, default_value = DEFAULT_PROFILE_ID)]
        profile: String,
        #[arg(long, default_value = DEFAULT_TARGET_ROLE)]
        role: String,
    },
    /// Show which controls a form would be filled through, without a browser
    Inspect {
        #[arg(long)]
        url: String,
    },
    /// List stored profile ids
    Profiles,
}

pub async fn handle_command(command: Command, mut config: AppConfig) -> Result<()> {
    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            start_web_server(config).await
        }

        Command::Apply { url, profile, role } => {
            let service = ApplicationService::chrome(&config)?;
            let request = ApplyRequest::new(url).with_profile(profile).with_role(role);
            let response = service.apply(&request).await;

            println!("{}", serde_json::to_string_pretty(&response)?);
            if response.ok {
                app_log!(info, "✅ Application submitted, proof: {:?}", response.proof);
                Ok(())
            } else {
                anyhow::bail!(
                    "Application failed: {}",
                    response.error.unwrap_or_else(|| "unknown error".to_string())
                )
            }
        }

        Command::Render { profile, role } => {
            let renderer = Arc::new(ChromePdfRenderer::new(
                config.browser.clone(),
                config.render.clone(),
            ));
            let generator = DocumentGenerator::from_config(&config, renderer)?;
            let profile = ProfileStore::from_config(&config).load(&profile).await?;

            let document = generator.generate(&profile, &role).await?;
            println!("{}", document.path.display());
            Ok(())
        }

        Command::Inspect { url } => {
            let patterns = InteractionPatterns::from_config(&config.engine)?;
            let plan = FormInspector::new(patterns)?
                .inspect(&url)
                .await
                .with_context(|| format!("Failed to inspect {}", url))?;

            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }

        Command::Profiles => {
            let store = ProfileStore::from_config(&config);
            let ids = store.list().await?;
            if ids.is_empty() {
                app_log!(
                    info,
                    "No stored profiles in {}",
                    config.storage.profiles_dir().display()
                );
            }
            for id in ids {
                println!("{}", id);
            }
            Ok(())
        }
    }
}
