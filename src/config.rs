//! Runtime configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional YAML file,
//! then environment variables (`COT_MODEL`, `COT_BASE_URL`, `COT_MAX_TOKENS`,
//! `COT_TIMEOUT_SECS`, `LOG_LEVEL`).

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_PROVIDER_ID: &str = "groq";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key when the keyring has none.
    pub api_key_env: String,
    /// Keyring user name for the API key.
    pub provider_id: String,
    pub default_temperature: f64,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub log_level: String,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            provider_id: DEFAULT_PROVIDER_ID.to_string(),
            default_temperature: 0.7,
            max_output_tokens: 4000,
            timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

impl ReasonerConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading config file");
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Full load: defaults, then `path` if given, then the environment; validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Unparseable numbers are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup("COT_MODEL").filter(|s| !s.trim().is_empty()) {
            self.model = model;
        }
        if let Some(url) = lookup("COT_BASE_URL").filter(|s| !s.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(tokens) = lookup("COT_MAX_TOKENS").and_then(|s| s.trim().parse().ok()) {
            self.max_output_tokens = tokens;
        }
        if let Some(secs) = lookup("COT_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            self.timeout_secs = secs;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|s| !s.trim().is_empty()) {
            self.log_level = level.to_lowercase();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base url: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone())
                    .with_source("config_loader"),
            )
        })?;

        if !(0.0..=1.0).contains(&self.default_temperature) {
            return Err(Error::configuration_with_context(
                "default_temperature must be between 0.0 and 1.0",
                ErrorContext::new()
                    .with_field_path("default_temperature")
                    .with_details(self.default_temperature.to_string())
                    .with_source("config_loader"),
            ));
        }

        if self.max_output_tokens == 0 {
            return Err(Error::configuration_with_context(
                "max_output_tokens must be greater than zero",
                ErrorContext::new()
                    .with_field_path("max_output_tokens")
                    .with_source("config_loader"),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model must not be empty",
                ErrorContext::new()
                    .with_field_path("model")
                    .with_source("config_loader"),
            ));
        }

        Ok(())
    }

    /// `base_url` joined with `/chat/completions`.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
