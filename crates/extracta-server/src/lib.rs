//! Extracta Server
//!
//! HTTP front end for the extractor: accepts a document and a JSON Schema,
//! returns the extraction and keeps it for later lookup.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use extracta_extractor::{Extractor, ExtractorError, InMemoryExtractionRepository};
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Extractor could not be built
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build application state from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let extractor = Extractor::from_credentials(&config.credentials, config.extractor.clone())?;

    Ok(AppState {
        extractor: Arc::new(extractor),
        repository: Arc::new(InMemoryExtractionRepository::new()),
        token: Arc::from(config.token.as_str()),
    })
}

/// Start the HTTP server
///
/// Builds the extractor from the configured credentials and serves until the
/// process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Extracta server");
    info!("Bind address: {}", config.bind_addr());
    info!("Max text length: {} chars", config.extractor.max_text_length);
    info!("Extraction timeout: {} seconds", config.extractor.extraction_timeout_secs);

    let state = build_state(&config)?;
    info!("Models: {}", state.extractor.available_models().join(", "));

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
