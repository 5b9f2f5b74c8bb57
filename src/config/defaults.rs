/// Config file read when neither `--config` nor `RI_CHECK_CONFIG` is given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "config.ini";

/// Environment variable that overrides the config file location.
pub(crate) const CONFIG_PATH_ENV: &str = "RI_CHECK_CONFIG";

/// Section headers starting with this prefix describe one AWS account.
pub(super) const ACCOUNT_SECTION_PREFIX: &str = "AWS ";

/// Region reported for an account that does not set one.
pub(super) const DEFAULT_REGION: &str = "us-east-1";

/// RDS and ElastiCache are checked unless an account turns them off.
pub(super) const DEFAULT_CHECK_RDS: bool = true;
pub(super) const DEFAULT_CHECK_ELASTICACHE: bool = true;
