use super::settings::AppConfig;
use anyhow::Result;
use std::collections::HashSet;

impl AppConfig {
    /// Validate configuration values are sane.
    pub(crate) fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.accounts.is_empty(),
            "Please specify at least one [AWS ...] section in the configuration file"
        );

        let mut seen = HashSet::new();
        for account in &self.accounts {
            anyhow::ensure!(
                !account.snapshot_dir.as_os_str().is_empty(),
                "snapshot_dir must not be empty in section [{}]",
                account.name
            );
            anyhow::ensure!(
                seen.insert(account.name.as_str()),
                "Duplicate account section [{}]",
                account.name
            );
        }
        Ok(())
    }
}
