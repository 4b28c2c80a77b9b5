//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
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

/// Load, override from the process environment, and validate.
///
/// The TOML file is optional; without it every value comes from defaults
/// and the environment.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => GatewayConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply the deployment environment variables on top of `config`.
///
/// | Variable     | Field                      |
/// |--------------|----------------------------|
/// | `PORT`       | port of `listener.bind_address` |
/// | `USERS_HOST` | `upstreams.users_url`      |
/// | `MEHMS_HOST` | `upstreams.mehms_url`      |
/// | `SECRET_KEY` | `auth.secret`              |
/// | `LOG_LEVEL`  | `observability.log_level`  |
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = lookup("PORT") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port.trim());
    }
    if let Some(users) = lookup("USERS_HOST") {
        config.upstreams.users_url = users;
    }
    if let Some(mehms) = lookup("MEHMS_HOST") {
        config.upstreams.mehms_url = mehms;
    }
    if let Some(secret) = lookup("SECRET_KEY") {
        config.auth.secret = secret;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    config
}
