//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::ValidationError;

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

/// Parse configuration from TOML text.
///
/// Not validated here: command-line overrides are applied first, then the
/// caller runs `validate_config` on the result.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_config;

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), RelayConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = parse_config(
            r#"
            [listener]
            port = 8080

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.address, "127.0.0.1");
        assert_eq!(config.listener.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.log_source);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let config = parse_config("[listener]\nport = 0").unwrap();
        let err = ConfigError::Validation(validate_config(&config).unwrap_err());
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(err.to_string(), "Validation failed: invalid port number: 0");
    }

    #[test]
    fn test_port_override_repairs_file_value() {
        let mut config = parse_config("[listener]\nport = 0").unwrap();
        config.apply_overrides(None, Some(8080));

        assert!(validate_config(&config).is_ok());
        assert_eq!(config.listener.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_address_override() {
        let mut config = parse_config("[listener]\naddress = \"\"").unwrap();
        assert!(validate_config(&config).is_err());

        config.apply_overrides(Some("0.0.0.0".to_string()), None);
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.listener.bind_address(), "0.0.0.0:9982");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/crawler-relay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
