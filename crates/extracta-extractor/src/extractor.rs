//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::credentials::ProviderCredentials;
use crate::error::ExtractorError;
use crate::prompt::MessageBuilder;
use crate::types::ExtractionRequest;
use extracta_domain::{Extraction, ExtractionSchemas, SchemaValidator};
use extracta_llm::LlmProvider;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns documents into schema-conforming data
///
/// Holds an immutable list of providers, one per model identifier. Each call
/// to [`Extractor::extract`] is independent; nothing is shared between calls
/// apart from the providers themselves.
pub struct Extractor {
    providers: Vec<Arc<dyn LlmProvider>>,
    config: ExtractorConfig,
    validator: SchemaValidator,
}

impl Extractor {
    /// Create a new Extractor
    pub fn new(
        providers: Vec<Arc<dyn LlmProvider>>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        if providers.is_empty() {
            return Err(ExtractorError::Config("No providers configured".to_string()));
        }
        config.validate().map_err(ExtractorError::Config)?;

        info!(
            "Extractor ready with models: {}",
            providers
                .iter()
                .map(|p| p.model())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            providers,
            config,
            validator: SchemaValidator::new(),
        })
    }

    /// Create an Extractor with every model available for the supplied keys
    pub fn from_credentials(
        credentials: &ProviderCredentials,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        Self::new(credentials.build_providers()?, config)
    }

    /// Model identifiers accepted by [`Extractor::extract`]
    pub fn available_models(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.model().to_string()).collect()
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract data matching `request.schema` from the loaded document
    pub async fn extract(&self, request: ExtractionRequest) -> Result<Extraction, ExtractorError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.model() == request.model)
            .ok_or_else(|| ExtractorError::UnsupportedModel(request.model.clone()))?;

        request.schema.check_well_formed()?;

        let text = request
            .loader
            .load()
            .await
            .map_err(|e| ExtractorError::LoadFailed(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(ExtractorError::LoadFailed("document is empty".to_string()));
        }

        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }

        info!(
            "Starting extraction with model '{}', text length {}",
            request.model, length
        );

        let messages = MessageBuilder::new(self.config.system_instruction.clone())
            .with_history(request.messages)
            .build(text);

        debug!("Sending {} messages", messages.len());

        let parsed = timeout(
            self.config.extraction_timeout(),
            provider.parse(&request.schema, &messages),
        )
        .await
        .map_err(|_| ExtractorError::Timeout)??;

        let data = match parsed.data {
            Some(value) => match self.validator.validate(&request.schema, &value) {
                Ok(()) => Some(value),
                Err(violation) => {
                    warn!(
                        "Provider for '{}' returned non-conforming data: {}",
                        request.model, violation
                    );
                    None
                }
            },
            None => None,
        };

        info!(
            "Extraction complete for '{}' (data: {})",
            request.model,
            if data.is_some() { "present" } else { "null" }
        );

        Ok(Extraction::new(
            request.model,
            ExtractionSchemas {
                original: request.schema,
                transformed: parsed.schema,
            },
            data,
            parsed.usage,
        ))
    }
}
