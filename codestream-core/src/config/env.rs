//! Environment variable interpolation for configuration

use super::error::ConfigError;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap_or_else(|e| panic!("invalid pattern: {e}"))
    })
}

/// Interpolate environment variables in a configuration string
///
/// Every `${VAR}` must be set; the first missing one is reported.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut missing = None;

    let result = env_var_pattern().replace_all(content, |cap: &regex::Captures<'_>| {
        match env::var(&cap[1]) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| cap[1].to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var) => Err(ConfigError::EnvVarNotFound { var }),
        None => Ok(result.into_owned()),
    }
}

/// Names of every variable referenced in `text`
pub fn referenced_env_vars(text: &str) -> Vec<String> {
    env_var_pattern()
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}
