//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read the optional config file, apply command-line overrides, then
/// validate the result once.
pub fn resolve_config(
    path: Option<&Path>,
    bind_address: Option<String>,
) -> Result<RouterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => RouterConfig::default(),
    };
    if let Some(bind_address) = bind_address {
        config.listener.bind_address = bind_address;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
