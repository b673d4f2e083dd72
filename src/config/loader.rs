//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.listener.bind_address, "0.0.0.0");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = parse_config(
            r#"
            [listener]
            port = 9000
            max_body_size = 1024

            [lifecycle]
            handle_signals = false
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.max_body_size, 1024);
        assert_eq!(config.listener.bind_address, "0.0.0.0");
        assert!(!config.lifecycle.handle_signals);
    }

    #[test]
    fn syntax_error_is_parse_error() {
        assert!(matches!(parse_config("[listener"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn semantic_error_is_validation_error() {
        let err = parse_config("[listener]\nmax_body_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("listener.max_body_size"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/dispatcher.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
