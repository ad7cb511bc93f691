//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GateServerConfig, ModSecurityConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("modsecurity_url cannot be empty")]
    EmptyModSecurityUrl,

    #[error("{field} is not a valid URL for this setting: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("verdict_timeout_ms must be greater than zero")]
    ZeroVerdictTimeout,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("invalid metrics address: {0}")]
    InvalidMetricsAddress(String),
}

impl ModSecurityConfig {
    /// Check the gate settings on their own.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        validate_gate(self, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validate a full server configuration.
pub fn validate_config(config: &GateServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_gate(&config.modsecurity, &mut errors);

    if !has_scheme(&config.upstream.url, &["http"]) {
        errors.push(ValidationError::InvalidUrl {
            field: "upstream.url",
            value: config.upstream.url.clone(),
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
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

fn validate_gate(config: &ModSecurityConfig, errors: &mut Vec<ValidationError>) {
    if config.modsecurity_url.is_empty() {
        errors.push(ValidationError::EmptyModSecurityUrl);
    } else if !has_scheme(&config.modsecurity_url, &["http", "https"]) {
        errors.push(ValidationError::InvalidUrl {
            field: "modsecurity.modsecurity_url",
            value: config.modsecurity_url.clone(),
        });
    }

    if config.verdict_timeout_ms == 0 {
        errors.push(ValidationError::ZeroVerdictTimeout);
    }
}

fn has_scheme(value: &str, schemes: &[&str]) -> bool {
    Url::parse(value)
        .map(|url| schemes.contains(&url.scheme()) && url.has_host())
        .unwrap_or(false)
}
