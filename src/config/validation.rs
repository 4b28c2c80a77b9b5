//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that both upstream URLs are present and reachable by the HTTP client
//! - Validate value ranges (body limit > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} is not a valid URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{field} must use the http scheme, got {scheme}")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    check_upstream("upstreams.users_url", &config.upstreams.users_url, &mut errors);
    check_upstream("upstreams.mehms_url", &config.upstreams.mehms_url, &mut errors);

    if config.auth.secret.trim().is_empty() {
        errors.push(ValidationError::Missing { field: "auth.secret" });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Missing { field });
        return;
    }

    match Url::parse(value) {
        Ok(url) if url.scheme() != "http" => errors.push(ValidationError::UnsupportedScheme {
            field,
            scheme: url.scheme().to_string(),
        }),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            reason: e.to_string(),
        }),
    }
}
