use anyhow::{Context, Result};
use apply_agent::app_log;
use apply_agent::cli::{handle_command, Cli, Command};
use apply_agent::AppConfig;
use clap::Parser;
use std::fs::OpenOptions;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    config.ensure_directories().await?;

    // Initialize logging once the logs directory exists
    let log_path = config.storage.logs_dir().join("worker.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("apply_agent=info,rocket::server=off")),
        )
        .init();

    app_log!(
        info,
        "Environment: {}",
        std::env::var("APPLY_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    );
    app_log!(info, "Data: {}", config.storage.data_dir.display());

    let command = cli.command.unwrap_or(Command::Serve { port: None });
    handle_command(command, config).await
}
