//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), endpoints = config.endpoints.prefixes.len(), "Configuration file loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::DEFAULT_ENDPOINTS;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.endpoints.prefixes.len(), DEFAULT_ENDPOINTS.len());
        assert_eq!(config.transport.timeout_secs, 15);
        assert_eq!(config.backoff.base_delay_ms, 0);
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [endpoints]
            prefixes = ["http://relay-a.test/fetch/", "http://relay-b.test/?url="]

            [backoff]
            base_delay_ms = 50
            max_delay_ms = 400

            [server]
            bind_address = "0.0.0.0:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoints.prefixes[1], "http://relay-b.test/?url=");
        assert_eq!(config.backoff.max_delay_ms, 400);
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.server.request_timeout_secs, 60);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = parse_config("[endpoints]\nprefixes = []\n[transport]\ntimeout_secs = 0\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: "), "{}", msg);
        assert!(msg.contains("at least one endpoint"));
        assert!(msg.contains("transport.timeout_secs must be greater than zero"));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[endpoints"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("relay-dispatch-{}.toml", std::process::id()));
        fs::write(&path, "[observability]\nlog_level = \"debug\"\n").unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.observability.log_level, "debug");

        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
