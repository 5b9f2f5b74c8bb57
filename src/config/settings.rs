use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One AWS account to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountConfig {
    /// Full section name, e.g. "AWS Production".
    pub name: String,
    /// Directory holding the account's collected API responses.
    pub snapshot_dir: PathBuf,
    pub region: String,
    pub rds: bool,
    pub elasticache: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub config_path: PathBuf,
    /// Accounts in file order; reports follow the same order.
    pub accounts: Vec<AccountConfig>,
}

impl AppConfig {
    /// Load and validate the config file at `path`.
    ///
    /// Relative snapshot directories resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let accounts = Self::parse_ini(&contents, base_dir)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        let config = Self { config_path: path.to_path_buf(), accounts };
        config.validate()?;
        Ok(config)
    }
}
