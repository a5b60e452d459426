//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoint prefixes before the pool is built
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: &RelayConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::endpoint::pool::validate_prefix;
use crate::endpoint::ConfigurationError;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoints.prefixes: {0}")]
    Endpoint(ConfigurationError),

    #[error("endpoints.prefixes: '{0}' is listed more than once")]
    DuplicateEndpoint(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("backoff.max_delay_ms ({max}) is below backoff.base_delay_ms ({base})")]
    BackoffRange { base: u64, max: u64 },

    #[error("observability.log_level: unknown level '{0}'")]
    LogLevel(String),
}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.prefixes.is_empty() {
        errors.push(ValidationError::Endpoint(ConfigurationError::EmptyPool));
    }
    let mut seen = HashSet::new();
    for prefix in &config.endpoints.prefixes {
        if let Err(e) = validate_prefix(prefix) {
            errors.push(ValidationError::Endpoint(e));
        }
        if !seen.insert(prefix.as_str()) {
            errors.push(ValidationError::DuplicateEndpoint(prefix.clone()));
        }
    }

    if config.transport.timeout_secs == 0 {
        errors.push(ValidationError::Zero("transport.timeout_secs"));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("server.request_timeout_secs"));
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("server.max_body_bytes"));
    }

    let backoff = &config.backoff;
    if backoff.base_delay_ms > 0 && backoff.max_delay_ms < backoff.base_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base: backoff.base_delay_ms,
            max: backoff.max_delay_ms,
        });
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }
    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }
    if tracing::Level::from_str(&observability.log_level).is_err() {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RelayConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = RelayConfig::default();
        config.endpoints.prefixes = vec![
            "https://a.test/?".into(),
            "https://a.test/?".into(),
            "nope".into(),
        ];
        config.transport.timeout_secs = 0;
        config.backoff.base_delay_ms = 500;
        config.backoff.max_delay_ms = 100;
        config.server.bind_address = "localhost".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6, "{:?}", errors);
        assert!(errors.contains(&ValidationError::DuplicateEndpoint("https://a.test/?".into())));
        assert!(errors.contains(&ValidationError::Zero("transport.timeout_secs")));
        assert!(errors.contains(&ValidationError::BackoffRange { base: 500, max: 100 }));
        assert!(errors.contains(&ValidationError::LogLevel("loud".into())));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let mut config = RelayConfig::default();
        config.endpoints.prefixes.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Endpoint(ConfigurationError::EmptyPool)]);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
