//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section has defaults so an empty file is a valid config.

use serde::{Deserialize, Serialize};

use crate::endpoint::DEFAULT_ENDPOINTS;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Endpoint prefixes for the pool.
    pub endpoints: EndpointsConfig,

    /// Outbound transport settings.
    pub transport: TransportConfig,

    /// Delay between failover attempts.
    pub backoff: BackoffConfig,

    /// Relay HTTP server.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Endpoint pool membership, in rotation order.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub prefixes: Vec<String>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-attempt timeout in seconds, unless the request sets its own.
    pub timeout_secs: u64,

    /// User-Agent header sent with every attempt.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: concat!("relay-dispatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Backoff between failover attempts. `base_delay_ms = 0` disables it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// Relay server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8787").
    pub bind_address: String,

    /// Whole-request timeout for inbound relay calls in seconds.
    pub request_timeout_secs: u64,

    /// Maximum inbound body size forwarded upstream, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            request_timeout_secs: 60,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
