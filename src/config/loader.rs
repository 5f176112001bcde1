//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
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

/// Load `.env` files the way the service has always been deployed:
/// `.env.<APP_ENV>` first (default `local`), then a plain `.env`.
/// Variables already present in the process environment are never replaced.
pub fn load_dotenv() {
    let profile = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
    let profile_file = format!(".env.{profile}");
    match dotenvy::from_filename(&profile_file) {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(file = %profile_file, error = %e, "Ignoring unreadable env file"),
    }
    dotenvy::dotenv().ok();
}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply the environment variables the service recognises on top of a
/// parsed configuration. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{}", port.trim());
    }
    if let Some(url) = lookup("BREWERY_API_URL") {
        config.upstream.base_url = url;
    }
    if let Some(secret) = lookup("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
}

/// Load, override and validate. A missing `path` starts from defaults.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
