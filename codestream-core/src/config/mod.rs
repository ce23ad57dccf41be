//! Configuration module
//!
//! Client configuration schema, file loading with `${VAR}` interpolation,
//! and validation.

mod env;
mod error;
mod schema;
mod validator;

pub use env::referenced_env_vars;
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{ClientConfig, ConnectionConfig, DEFAULT_SERVICE_NAME, SUPPORTED_VERSION};
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<ClientConfig> {
    let path = path.as_ref();
    let content = read(path)?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let config: ClientConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    finish(path, config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<ClientConfig> {
    let path = path.as_ref();
    let content = read(path)?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let config: ClientConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    finish(path, config)
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn finish(path: &Path, config: ClientConfig) -> ConfigResult<ClientConfig> {
    ConfigValidator::new().validate(&config)?;
    debug!(
        "loaded client config from {} (endpoint {})",
        path.display(),
        config.endpoint
    );
    Ok(config)
}
