mod defaults;
mod parser;
mod settings;
mod validation;

pub(crate) use defaults::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
pub(crate) use settings::{AccountConfig, AppConfig};
