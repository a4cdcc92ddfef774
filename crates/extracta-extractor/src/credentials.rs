//! Provider wiring from API keys

use crate::error::ExtractorError;
use extracta_llm::{gemini, mistral, openai};
use extracta_llm::{GeminiProvider, LlmProvider, MistralProvider, OpenAiProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// API keys per provider family
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCredentials {
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// Mistral API key
    pub mistral_api_key: Option<String>,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("ProviderCredentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("mistral_api_key", &redact(&self.mistral_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .finish()
    }
}

impl ProviderCredentials {
    /// Whether no key is set
    pub fn is_empty(&self) -> bool {
        self.openai_api_key.is_none() && self.mistral_api_key.is_none() && self.gemini_api_key.is_none()
    }

    /// Build every catalog model for each supplied key
    pub fn build_providers(&self) -> Result<Vec<Arc<dyn LlmProvider>>, ExtractorError> {
        if self.is_empty() {
            return Err(ExtractorError::Config("No API keys provided".to_string()));
        }

        let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();

        if let Some(key) = &self.openai_api_key {
            for spec in openai::MODELS {
                providers.push(Arc::new(OpenAiProvider::new(key.clone(), spec.id)?));
            }
        }
        if let Some(key) = &self.mistral_api_key {
            for spec in mistral::MODELS {
                providers.push(Arc::new(MistralProvider::new(key.clone(), spec.id)?));
            }
        }
        if let Some(key) = &self.gemini_api_key {
            for spec in gemini::MODELS {
                providers.push(Arc::new(GeminiProvider::new(key.clone(), spec.id)?));
            }
        }

        info!("Configured {} provider models", providers.len());
        Ok(providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys() {
        let err = ProviderCredentials::default().build_providers().err().unwrap();
        assert_eq!(err.to_string(), "Configuration error: No API keys provided");
    }

    #[test]
    fn test_models_per_key() {
        let credentials = ProviderCredentials {
            mistral_api_key: Some("m".to_string()),
            gemini_api_key: Some("g".to_string()),
            ..Default::default()
        };
        let providers = credentials.build_providers().unwrap();
        let models: Vec<&str> = providers.iter().map(|p| p.model()).collect();

        assert_eq!(
            models,
            vec![
                "mistral-large",
                "ministral-8b",
                "pixtral-large",
                "gemini-2.0-flash",
                "gemini-2.0-flash-lite"
            ]
        );
    }

    #[test]
    fn test_debug_redacts_keys() {
        let credentials = ProviderCredentials {
            openai_api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
