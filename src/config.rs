//! Processing configuration.
//!
//! Settings come from defaults, a JSON document or prefixed environment
//! variables (`SABER_DI_MAX_REPORTED_DIAGNOSTICS=20`). Every field is optional
//! in every source; missing fields keep their defaults.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default prefix for environment variables.
pub const ENV_PREFIX: &str = "SABER_DI";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {variable}: expected {expected}")]
    InvalidEnvValue {
        variable: String,
        value: String,
        expected: &'static str,
    },
    #[cfg(feature = "json")]
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a processing run reports its problems.
///
/// Every validation pass always runs: a graph only becomes a
/// [`ValidatedGraph`](crate::ValidatedGraph) once duplicate providers,
/// unresolved dependencies, cycles and injection targets have all been
/// checked. Configuration only shapes the report.
///
/// # Examples
///
/// ```
/// use saber_di::ProcessorConfig;
///
/// let config = ProcessorConfig::from_json_str(r#"{ "max_reported_diagnostics": 5 }"#).unwrap();
/// assert_eq!(config.max_reported_diagnostics, Some(5));
/// assert!(config.log_diagnostics);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Emit a `warn!` event per diagnostic
    pub log_diagnostics: bool,
    /// Caps the number of diagnostics listed in a failure. The run fails
    /// either way.
    pub max_reported_diagnostics: Option<usize>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            log_diagnostics: true,
            max_reported_diagnostics: None,
        }
    }
}

impl ProcessorConfig {
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `SABER_DI_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Defaults overridden by `{PREFIX}_LOG_DIAGNOSTICS` and
    /// `{PREFIX}_MAX_REPORTED_DIAGNOSTICS`.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let source = EnvSource::new(prefix);
        if let Some(value) = source.flag("log_diagnostics")? {
            config.log_diagnostics = value;
        }
        if let Some(value) = source.count("max_reported_diagnostics")? {
            config.max_reported_diagnostics = Some(value);
        }
        Ok(config)
    }
}

/// Reads `PREFIX_KEY` style environment variables.
#[derive(Debug)]
struct EnvSource {
    prefix: String,
}

impl EnvSource {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_uppercase(),
        }
    }

    fn raw(&self, key: &str) -> Option<(String, String)> {
        let variable = format!("{}_{}", self.prefix, key.to_uppercase());
        env::var(&variable).ok().map(|value| (variable, value))
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some((variable, value)) = self.raw(key) else {
            return Ok(None);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvValue {
                variable,
                value,
                expected: "a boolean",
            }),
        }
    }

    fn count(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        let Some((variable, value)) = self.raw(key) else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue {
                variable,
                value,
                expected: "a non-negative integer",
            })
    }
}
