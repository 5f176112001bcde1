//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected so an operator sees every mistake in one run.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is not a socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.base_url is not an absolute http(s) URL: {0:?}")]
    InvalidBaseUrl(String),

    #[error("auth.jwt_secret must not be empty")]
    MissingJwtSecret,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a configuration, returning every violation found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(
            config.upstream.base_url.clone(),
        )),
    }

    if config.upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::Zero("upstream.timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.connect_timeout_secs"));
    }

    if config.auth.jwt_secret.trim().is_empty() {
        errors.push(ValidationError::MissingJwtSecret);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
