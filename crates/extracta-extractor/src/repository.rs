//! In-memory extraction repository

use async_trait::async_trait;
use extracta_domain::{Extraction, ExtractionId, ExtractionRepository, RepositoryError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local [`ExtractionRepository`]
///
/// Records live as long as the process; there is no eviction.
#[derive(Debug, Default)]
pub struct InMemoryExtractionRepository {
    extractions: RwLock<HashMap<ExtractionId, Extraction>>,
}

impl InMemoryExtractionRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.extractions.read().await.len()
    }

    /// Whether no record is stored
    pub async fn is_empty(&self) -> bool {
        self.extractions.read().await.is_empty()
    }
}

#[async_trait]
impl ExtractionRepository for InMemoryExtractionRepository {
    async fn save(&self, extraction: &Extraction) -> Result<(), RepositoryError> {
        let mut extractions = self.extractions.write().await;
        if extractions.contains_key(&extraction.id()) {
            return Err(RepositoryError::Duplicate(extraction.id()));
        }
        extractions.insert(extraction.id(), extraction.clone());
        Ok(())
    }

    async fn find(&self, id: ExtractionId) -> Result<Option<Extraction>, RepositoryError> {
        Ok(self.extractions.read().await.get(&id).cloned())
    }
}
