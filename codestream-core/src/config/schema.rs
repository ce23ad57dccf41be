//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use crate::http::StaticEndpointResolver;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Service name used in `x-amz-target` when none is configured
pub const DEFAULT_SERVICE_NAME: &str = "AmazonCodeWhispererStreamingService";

/// Schema versions this crate understands
pub const SUPPORTED_VERSION: &str = "0.1";

/// Root configuration structure for a streaming client
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Absolute URL of the service endpoint
    pub endpoint: String,

    /// Service name used in the `x-amz-target` header
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Connection settings for the HTTP transport
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Profile applied to requests that do not name one
    #[serde(default)]
    pub profile_arn: Option<String>,
}

/// Connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Maximum idle connections per host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,

    /// Largest non-streaming body the transport will read
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_idle_per_host: default_max_idle(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// Default value functions for serde
fn default_service_name() -> String { DEFAULT_SERVICE_NAME.to_string() }
fn default_user_agent() -> String { format!("codestream/{}", env!("CARGO_PKG_VERSION")) }
fn default_connect_timeout() -> u64 { 10000 }
fn default_request_timeout() -> u64 { 300000 }
fn default_max_idle() -> usize { 10 }
fn default_max_response_bytes() -> usize { 10 * 1024 * 1024 }

impl ClientConfig {
    /// Minimal configuration for an endpoint, everything else defaulted
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            version: SUPPORTED_VERSION.to_string(),
            endpoint: endpoint.into(),
            service_name: default_service_name(),
            connection: ConnectionConfig::default(),
            user_agent: default_user_agent(),
            profile_arn: None,
        }
    }

    /// Resolver for the configured endpoint
    pub fn endpoint_resolver(&self) -> Result<StaticEndpointResolver, ValidationError> {
        StaticEndpointResolver::from_url(&self.endpoint)
            .map_err(|e| ValidationError::invalid_url("endpoint", e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::required("version"));
        }

        if self.version != SUPPORTED_VERSION {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::InvalidVersion {
                    expected: SUPPORTED_VERSION.to_string(),
                    actual: self.version.clone(),
                },
            ));
        }

        if self.endpoint.is_empty() {
            return Err(ValidationError::required("endpoint"));
        }

        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| ValidationError::invalid_url("endpoint", e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ValidationError::invalid_url(
                "endpoint",
                format!("scheme must be http or https, got {}", url.scheme()),
            ));
        }

        if self.service_name.trim().is_empty() {
            return Err(ValidationError::required("service_name"));
        }

        if let Some(arn) = &self.profile_arn {
            if arn.is_empty() {
                return Err(ValidationError::invalid_format(
                    "profile_arn",
                    "Must not be empty when present",
                ));
            }
        }

        self.connection.validate("connection")
    }
}

impl ConnectionConfig {
    /// Validate connection settings
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.connect_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.connect_timeout_ms", path),
                "Must be greater than 0",
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.request_timeout_ms", path),
                "Must be greater than 0",
            ));
        }

        if self.request_timeout_ms < self.connect_timeout_ms {
            return Err(ValidationError::new(
                format!("{}.request_timeout_ms", path),
                ValidationErrorKind::Incompatible {
                    message: "Must be >= connect_timeout_ms".to_string(),
                },
            ));
        }

        if self.max_response_bytes == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.max_response_bytes", path),
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_yaml() {
        let yaml = r#"
version: "0.1"
endpoint: https://codewhisperer.us-east-1.amazonaws.com
"#;
        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(config.connection.connect_timeout_ms, 10000);
        assert_eq!(config.connection.max_response_bytes, 10 * 1024 * 1024);
        assert!(config.user_agent.starts_with("codestream/"));
        assert!(config.profile_arn.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = r#"
version: "0.1"
endpoint: https://example.com
retries: 3
"#;
        assert!(serde_yaml::from_str::<ClientConfig>(yaml).is_err());
    }

    #[test]
    fn test_version_mismatch() {
        let mut config = ClientConfig::new("https://example.com");
        config.version = "2.0".to_string();

        let err = config.validate().unwrap_err();
        assert_eq!(err.field_path, "version");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidVersion { .. }));
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let config = ClientConfig::new("ftp://example.com");
        let err = config.validate().unwrap_err();
        assert_eq!(err.field_path, "endpoint");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl { .. }));

        let config = ClientConfig::new("not a url");
        assert!(config.validate().is_err());
        assert!(config.endpoint_resolver().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ClientConfig::new("https://example.com");
        config.connection.request_timeout_ms = 0;

        let err = config.validate().unwrap_err();
        assert_eq!(err.field_path, "connection.request_timeout_ms");
    }

    #[test]
    fn test_blank_service_name_rejected() {
        let mut config = ClientConfig::new("https://example.com");
        config.service_name = "  ".to_string();
        assert_eq!(config.validate().unwrap_err().field_path, "service_name");
    }
}
