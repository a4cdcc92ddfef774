//! Configuration file parsing for the server.
//!
//! Loads settings from a TOML file, then lets environment variables override
//! the token and the provider API keys.

use extracta_extractor::{ExtractorConfig, ProviderCredentials};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding the OpenAI API key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable overriding the Mistral API key
pub const MISTRAL_API_KEY_VAR: &str = "MISTRAL_API_KEY";
/// Environment variable overriding the Gemini API key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable overriding the access token
pub const TOKEN_VAR: &str = "EXTRACTA_TOKEN";

const MAX_API_KEY_LENGTH: usize = 256;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid configuration field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Value every `/api` request must present in `Authorization`
    pub token: String,

    /// Provider API keys
    pub credentials: ProviderCredentials,

    /// Extraction limits and instruction
    pub extractor: ExtractorConfig,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ServerConfig")
            .field("bind_address", &self.bind_address)
            .field("bind_port", &self.bind_port)
            .field("token", &token)
            .field("credentials", &self.credentials)
            .field("extractor", &self.extractor)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            token: String::new(),
            credentials: ProviderCredentials::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, apply environment overrides and validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ServerConfig = toml::from_str(&contents)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from defaults and the environment only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace fields with values found by `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let found = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(token) = found(TOKEN_VAR) {
            self.token = token;
        }
        if let Some(key) = found(OPENAI_API_KEY_VAR) {
            self.credentials.openai_api_key = Some(key);
        }
        if let Some(key) = found(MISTRAL_API_KEY_VAR) {
            self.credentials.mistral_api_key = Some(key);
        }
        if let Some(key) = found(GEMINI_API_KEY_VAR) {
            self.credentials.gemini_api_key = Some(key);
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::MissingField("token".to_string()));
        }
        if self.credentials.is_empty() {
            return Err(ConfigError::MissingField(
                "credentials (at least one API key)".to_string(),
            ));
        }

        let keys = [
            ("openai_api_key", &self.credentials.openai_api_key),
            ("mistral_api_key", &self.credentials.mistral_api_key),
            ("gemini_api_key", &self.credentials.gemini_api_key),
        ];
        for (field, key) in keys {
            if let Some(key) = key {
                let length = key.chars().count();
                if length == 0 || length > MAX_API_KEY_LENGTH {
                    return Err(ConfigError::InvalidField {
                        field: field.to_string(),
                        reason: format!("must be 1 to {} characters", MAX_API_KEY_LENGTH),
                    });
                }
            }
        }

        self.extractor
            .validate()
            .map_err(|reason| ConfigError::InvalidField {
                field: "extractor".to_string(),
                reason,
            })
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
