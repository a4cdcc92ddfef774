//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// System instruction placed before every conversation
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert at extracting data from documents. \
You will be given the text content of a document and you will need to extract the data from it.";

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum document length (characters)
    pub max_text_length: usize,

    /// Maximum time for a single provider call (seconds)
    pub extraction_timeout_secs: u64,

    /// Instruction sent as the first system message
    pub system_instruction: String,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.system_instruction.trim().is_empty() {
            return Err("system_instruction must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: 200_000,
            extraction_timeout_secs: 120,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_max_text_length() {
        let config = ExtractorConfig {
            max_text_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let config = ExtractorConfig {
            extraction_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_instruction_rejected() {
        let config = ExtractorConfig {
            system_instruction: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("max_text_length = 10").unwrap();
        assert_eq!(parsed.max_text_length, 10);
        assert_eq!(parsed.extraction_timeout_secs, 120);
        assert_eq!(parsed.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
    }
}
