use super::defaults::{
    ACCOUNT_SECTION_PREFIX, DEFAULT_CHECK_ELASTICACHE, DEFAULT_CHECK_RDS, DEFAULT_REGION,
};
use super::settings::{AccountConfig, AppConfig};
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const KNOWN_KEYS: &[&str] = &["snapshot_dir", "region", "rds", "elasticache"];

/// Key/value pairs of one account section, before defaults are applied.
struct RawSection {
    name: String,
    line: usize,
    values: HashMap<String, String>,
}

pub(super) fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("'{value}' is not a boolean"),
    }
}

impl RawSection {
    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        self.values.get(key).map_or(Ok(default), |v| {
            parse_bool(v).with_context(|| format!("Option {key} in section [{}]", self.name))
        })
    }

    fn into_account(self, base_dir: &Path) -> Result<AccountConfig> {
        let Some(dir) = self.values.get("snapshot_dir") else {
            bail!(
                "Required configuration option for an AWS account (snapshot_dir) \
                 in section [{}] (line {}) is not configured",
                self.name,
                self.line
            );
        };
        let dir = Path::new(dir);
        let snapshot_dir = if dir.is_absolute() || dir.as_os_str().is_empty() {
            dir.to_path_buf()
        } else {
            base_dir.join(dir)
        };

        Ok(AccountConfig {
            rds: self.flag("rds", DEFAULT_CHECK_RDS)?,
            elasticache: self.flag("elasticache", DEFAULT_CHECK_ELASTICACHE)?,
            region: self
                .values
                .get("region")
                .cloned()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            snapshot_dir,
            name: self.name,
        })
    }
}

impl AppConfig {
    /// Parse the INI-style config into account settings, in file order.
    ///
    /// Sections whose name starts with `AWS ` are accounts; other sections are skipped.
    pub(crate) fn parse_ini(contents: &str, base_dir: &Path) -> Result<Vec<AccountConfig>> {
        let header = Regex::new(r"^\[\s*([^\]]*?)\s*\]$")?;

        let mut sections: Vec<RawSection> = Vec::new();
        let mut in_account = false;

        for (idx, line) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(caps) = header.captures(line) {
                let name = caps.get(1).map_or("", |m| m.as_str());
                in_account = name.starts_with(ACCOUNT_SECTION_PREFIX);
                if in_account {
                    sections.push(RawSection {
                        name: name.to_string(),
                        line: line_no,
                        values: HashMap::new(),
                    });
                } else {
                    debug!("Ignoring section [{}]", name);
                }
                continue;
            }

            let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) else {
                bail!("Line {line_no}: expected 'key = value', found '{line}'");
            };
            if !in_account {
                continue;
            }

            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown option '{}' on line {}", key, line_no);
                continue;
            }
            if let Some(section) = sections.last_mut() {
                section.values.insert(key, value);
            }
        }

        sections.into_iter().map(|s| s.into_account(base_dir)).collect()
    }
}
