//! Configuration validation utilities

use super::error::{ValidationError, ValidationErrorKind};
use super::schema::ClientConfig;
use regex::Regex;
use tracing::warn;

/// Configuration validator with rules beyond the schema's own checks
pub struct ConfigValidator {
    /// Pattern for environment variable placeholders
    env_var_pattern: Regex,
    /// Pattern for well-formed profile ARNs
    arn_pattern: Regex,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            env_var_pattern: compile(r"\$\{([A-Z_][A-Z0-9_]*)\}"),
            arn_pattern: compile(r"^arn:[a-z0-9-]+:[a-z0-9-]+:[a-z0-9-]*:[0-9]*:.+$"),
        }
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &ClientConfig) -> Result<(), ValidationError> {
        config.validate()?;

        self.validate_no_placeholders(config)?;
        self.validate_profile_arn(config)?;
        self.validate_user_agent(config)?;

        if !config.endpoint.starts_with("https://") {
            warn!("endpoint {} does not use TLS", config.endpoint);
        }
        Ok(())
    }

    /// Placeholders must be resolved before the config is used
    fn validate_no_placeholders(&self, config: &ClientConfig) -> Result<(), ValidationError> {
        let fields = [
            ("endpoint", Some(config.endpoint.as_str())),
            ("service_name", Some(config.service_name.as_str())),
            ("profile_arn", config.profile_arn.as_deref()),
        ];

        for (path, value) in fields {
            if let Some(cap) = value.and_then(|v| self.env_var_pattern.captures(v)) {
                return Err(ValidationError::new(
                    path,
                    ValidationErrorKind::UnresolvedVariable {
                        var: cap[1].to_string(),
                    },
                ));
            }
        }

        Ok(())
    }

    fn validate_profile_arn(&self, config: &ClientConfig) -> Result<(), ValidationError> {
        match &config.profile_arn {
            Some(arn) if !self.arn_pattern.is_match(arn) => Err(ValidationError::invalid_format(
                "profile_arn",
                "expected an ARN (arn:partition:service:region:account:resource)",
            )),
            _ => Ok(()),
        }
    }

    fn validate_user_agent(&self, config: &ClientConfig) -> Result<(), ValidationError> {
        if config.user_agent.trim().is_empty() {
            return Err(ValidationError::required("user_agent"));
        }
        Ok(())
    }

    /// Extract environment variables from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        self.env_var_pattern
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {pattern}: {e}"))
}
