//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default capture ceiling: 10 MiB.
///
/// Any upload larger than this is treated as an error unless raised here.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Default timeout for the verdict call, in milliseconds.
pub const DEFAULT_VERDICT_TIMEOUT_MS: u64 = 2_000;

/// Root configuration for the standalone gate server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream service the gate protects.
    pub upstream: UpstreamConfig,

    /// Decision-service settings.
    pub modsecurity: ModSecurityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the protected service (e.g., "http://127.0.0.1:3000").
    pub url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Gate configuration: where verdicts come from and how failures resolve.
///
/// Field aliases accept the camel-case names used by the Traefik plugin
/// configuration, so existing JSON configs load unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModSecurityConfig {
    /// Base URL of the decision service. Required.
    #[serde(alias = "modSecurityUrl")]
    pub modsecurity_url: String,

    /// Maximum request body the gate buffers, in bytes.
    #[serde(alias = "maxBodySize")]
    pub max_body_size: usize,

    /// Short-circuit with 413/502 on internal errors instead of failing open.
    #[serde(alias = "InterruptOnError", alias = "interruptOnError")]
    pub interrupt_on_error: bool,

    /// Forward to the upstream when the decision service itself answers 5xx.
    #[serde(alias = "Ignore500Error", alias = "ignore500Error")]
    pub ignore_500_error: bool,

    /// Timeout for the verdict call in milliseconds.
    #[serde(alias = "verdictTimeoutMs")]
    pub verdict_timeout_ms: u64,
}

impl ModSecurityConfig {
    /// Config pointing at `url` with every other field defaulted.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            modsecurity_url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for ModSecurityConfig {
    fn default() -> Self {
        Self {
            modsecurity_url: String::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            interrupt_on_error: true,
            ignore_500_error: false,
            verdict_timeout_ms: DEFAULT_VERDICT_TIMEOUT_MS,
        }
    }
}

/// Timeout configuration for the host server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
