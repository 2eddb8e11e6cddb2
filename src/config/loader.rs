//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that replaces the listener port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Port(String),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Port(p) => write!(f, "Invalid {} value: {:?}", PORT_ENV, p),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Replace the listener port with `port` when one is given.
///
/// Returns whether an override was applied.
pub fn apply_port_override(
    config: &mut GatewayConfig,
    port: Option<&str>,
) -> Result<bool, ConfigError> {
    let Some(port) = port else {
        return Ok(false);
    };
    let port: u16 = port
        .trim()
        .parse()
        .map_err(|_| ConfigError::Port(port.to_string()))?;

    let mut addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|_| ConfigError::Validation(vec![ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        )]))?;
    addr.set_port(port);
    config.listener.bind_address = addr.to_string();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.rules.directory, "./rules");
        assert_eq!(config.auth.env_var, "FCS_AUTH");
        assert_eq!(config.auth.file, "/secrets/auth.yml");
    }

    #[test]
    fn test_partial_document() {
        let config = parse_config(
            r#"
            [rules]
            directory = "/etc/gateway/rules"

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.rules.directory, "/etc/gateway/rules");
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = parse_config("[timeouts]\nrequest_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = parse_config("[listener\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_port_override() {
        let mut config = GatewayConfig::default();
        assert!(!apply_port_override(&mut config, None).unwrap());
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");

        assert!(apply_port_override(&mut config, Some("9191")).unwrap());
        assert_eq!(config.listener.bind_address, "0.0.0.0:9191");

        let err = apply_port_override(&mut config, Some("http")).unwrap_err();
        assert!(matches!(err, ConfigError::Port(_)));
    }
}
