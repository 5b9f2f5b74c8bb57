use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

mod collector;
mod config;
mod engine;
mod report;
mod run;

#[cfg(test)]
mod tests;

use config::{AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use report::OutputFormat;

/// Compare instance reservations and running instances for AWS services.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "check_reserved_instances=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    info!("check-reserved-instances v{} starting", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&cli.config)?;
    info!(
        "Configuration loaded from {}: {} account(s)",
        config.config_path.display(),
        config.accounts.len()
    );

    let now = chrono::Utc::now();
    let reports = run::check_all(&config, now).await?;
    let rendered = report::render(&reports, cli.format)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes()).context("Failed to write report")?;
    stdout.flush()?;

    info!("Reported on {} account(s)", reports.len());
    Ok(())
}
