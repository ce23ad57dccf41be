//! Configuration errors

use std::fmt;
use thiserror::Error;

/// Failure to load or accept a client configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config '{path}' (line {}, column {}): {message}",
            .line.unwrap_or(0), .column.unwrap_or(0))]
    ParseError {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("invalid config: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("environment variable '{var}' is not set")]
    EnvVarNotFound { var: String },

    #[error("cannot build HTTP transport: {message}")]
    HttpClient { message: String },
}

/// A rejected configuration value and where it lives
#[derive(Debug, Error)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `connection.request_timeout_ms`
    pub field_path: String,
    pub kind: ValidationErrorKind,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_path, self.kind)
    }
}

#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("required field is missing")]
    RequiredFieldMissing,

    #[error("value out of range: {message}")]
    OutOfRange { message: String },

    #[error("invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("conflicts with another setting: {message}")]
    Incompatible { message: String },

    #[error("invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("unsupported version {actual} (this client reads {expected})")]
    InvalidVersion { expected: String, actual: String },

    #[error("unresolved environment variable '{var}'")]
    UnresolvedVariable { var: String },
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
        }
    }

    pub fn required(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::RequiredFieldMissing)
    }

    pub fn out_of_range(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::OutOfRange {
                message: message.into(),
            },
        )
    }

    pub fn invalid_format(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidFormat {
                message: message.into(),
            },
        )
    }

    pub fn invalid_url(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidUrl {
                message: message.into(),
            },
        )
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::out_of_range(
            "connection.connect_timeout_ms",
            "Must be greater than 0",
        );
        assert_eq!(
            err.to_string(),
            "connection.connect_timeout_ms: value out of range: Must be greater than 0"
        );
    }

    #[test]
    fn test_config_error_wraps_validation() {
        let err: ConfigError = ValidationError::required("endpoint").into();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert_eq!(err.to_string(), "invalid config: endpoint: required field is missing");
    }

    #[test]
    fn test_parse_error_without_location() {
        let err = ConfigError::ParseError {
            path: "client.yaml".to_string(),
            line: None,
            column: None,
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "cannot parse config 'client.yaml' (line 0, column 0): bad");
    }
}
