//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GateServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and gate construction.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Json(serde_json::Error),
    Validation(Vec<ValidationError>),
    /// The verdict transport could not be built.
    Transport(reqwest::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON parse error: {}", e),
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
            ConfigError::Transport(e) => write!(f, "Failed to build verdict client: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Validation(errors)
    }
}

/// Load and validate configuration from a TOML (or `.json`) file.
pub fn load_config(path: &Path) -> Result<GateServerConfig, ConfigError> {
    let config = read_config(path)?;

    validate_config(&config)?;

    Ok(config)
}

/// Parse a configuration file without validating it, so callers can
/// apply overrides first.
pub fn read_config(path: &Path) -> Result<GateServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, is_json(path))
}

fn parse_config(content: &str, json: bool) -> Result<GateServerConfig, ConfigError> {
    if json {
        serde_json::from_str(content).map_err(ConfigError::Json)
    } else {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
