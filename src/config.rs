//! Environment-driven configuration.
//!
//! The credential is required; everything else has a default. Nothing here
//! touches the network.

use crate::error::ConfigError;
use crate::models::{GenerationConfig, SafetyPolicy};
use std::fmt;
use std::time::Duration;

pub const CREDENTIAL_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite-preview-02-05";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Secret API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Reads the service credential from `GEMINI_API_KEY`.
pub fn load_credential() -> Result<Credential, ConfigError> {
    load_credential_from(CREDENTIAL_VAR)
}

pub fn load_credential_from(var: &str) -> Result<Credential, ConfigError> {
    match std::env::var(var) {
        Ok(value) => Credential::new(value),
        Err(_) => Err(ConfigError::MissingCredential),
    }
}

/// Operational settings with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_id: String,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let model_id = lookup("GEMINI_MODEL")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or(defaults.model_id);

        let request_timeout = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("ANALYSIS_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => parse_positive("MAX_UPLOAD_BYTES", &raw)?,
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            model_id,
            request_timeout,
            max_upload_bytes,
        })
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
    T::Err: fmt::Display,
{
    let invalid = |reason: String| ConfigError::InvalidSetting {
        name,
        value: raw.to_string(),
        reason,
    };
    let value: T = raw.trim().parse().map_err(|e: T::Err| invalid(e.to_string()))?;
    if value < T::from(1) {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(value)
}

/// Everything the inference client needs, built once at startup.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub credential: Credential,
    pub generation: GenerationConfig,
    pub safety: SafetyPolicy,
    pub model_id: String,
    pub timeout: Duration,
}

impl AnalysisConfig {
    /// Default generation parameters and safety thresholds.
    pub fn new(credential: Credential, settings: &Settings) -> Self {
        Self {
            credential,
            generation: GenerationConfig::default(),
            safety: SafetyPolicy::default(),
            model_id: settings.model_id.clone(),
            timeout: settings.request_timeout,
        }
    }
}
