mod model;
mod text;

use anyhow::{Context, Result};
use clap::ValueEnum;

pub(crate) use model::{AccountReport, ServiceKind, ServiceReport};
#[cfg(test)]
pub(crate) use model::UnitShortfall;
pub(crate) use text::render_text;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty-printed JSON array of account reports.
pub(crate) fn render_json(reports: &[AccountReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("Failed to serialize report")
}

pub(crate) fn render(reports: &[AccountReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => render_text(reports).context("Failed to render text report"),
        OutputFormat::Json => render_json(reports),
    }
}
