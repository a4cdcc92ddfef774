//! HTTP request handlers for the extraction service.
//!
//! Implements document extraction, model listing, extraction lookup and
//! health check endpoints using axum.

use axum::{
    extract::{Multipart, Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use extracta_domain::{
    Extraction, ExtractionId, ExtractionRepository, Message, RepositoryError, Schema,
};
use extracta_extractor::{BytesLoader, ExtractionRequest, Extractor, ExtractorError};
use extracta_llm::LlmError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator shared by all requests
    pub extractor: Arc<Extractor>,
    /// Where successful extractions are kept
    pub repository: Arc<dyn ExtractionRepository>,
    /// Expected `Authorization` value
    pub token: Arc<str>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of configured models
    pub model_count: usize,
}

/// Model listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    /// Identifiers accepted by the extract endpoint
    pub models: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or wrong token
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed request
    #[error("{0}")]
    BadRequest(String),

    /// Unknown resource
    #[error("{0}")]
    NotFound(String),

    /// Extraction failure
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// Repository failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Extractor(e) => match e {
                ExtractorError::UnsupportedModel(_) => StatusCode::NOT_FOUND,
                ExtractorError::Schema(_) => StatusCode::BAD_REQUEST,
                ExtractorError::LoadFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ExtractorError::TextTooLong(..) => StatusCode::PAYLOAD_TOO_LARGE,
                ExtractorError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ExtractorError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ExtractorError::Llm(LlmError::UnsupportedMessage(_) | LlmError::Compile(_)) => {
                    StatusCode::BAD_REQUEST
                }
                ExtractorError::Llm(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Reject `/api` requests whose `Authorization` header does not carry the token
///
/// Both `<token>` and `Bearer <token>` are accepted.
async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value));

    match presented {
        Some(token) if token == &*state.token => Ok(next.run(request).await),
        _ => Err(AppError::Unauthorized),
    }
}

/// Parts of the extract form
#[derive(Default)]
struct ExtractForm {
    file: Option<Vec<u8>>,
    schema: Option<String>,
    messages: Option<String>,
}

impl ExtractForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ExtractForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed form: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Malformed form field {}: {}", name, e)))?;
            let text = || {
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| AppError::BadRequest(format!("Form field {} must be UTF-8", name)))
            };

            match name.as_str() {
                "file" => form.file = Some(bytes.to_vec()),
                "schema" => form.schema = Some(text()?),
                "messages" => form.messages = Some(text()?),
                _ => {}
            }
        }

        Ok(form)
    }
}

/// POST /api/v1/extract/:model - Extract data from an uploaded document
async fn extract(
    State(state): State<AppState>,
    Path(model): Path<String>,
    multipart: Multipart,
) -> Result<Json<Extraction>, AppError> {
    let form = ExtractForm::read(multipart).await?;

    let file = form
        .file
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("A non-empty file is required".to_string()))?;

    let schema_text = form
        .schema
        .ok_or_else(|| AppError::BadRequest("A schema is required".to_string()))?;
    let schema_value: serde_json::Value = serde_json::from_str(&schema_text)
        .map_err(|e| AppError::BadRequest(format!("Schema is not valid JSON: {}", e)))?;
    let schema = Schema::from_value(&schema_value)
        .map_err(|e| AppError::BadRequest(format!("Invalid schema: {}", e)))?;

    let messages: Vec<Message> = match form.messages {
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| AppError::BadRequest(format!("Invalid messages: {}", e)))?,
        None => Vec::new(),
    };

    info!("Extract request for model '{}' ({} bytes)", model, file.len());

    let request =
        ExtractionRequest::new(BytesLoader::new(file), schema, model).with_messages(messages);
    let extraction = state.extractor.extract(request).await?;
    state.repository.save(&extraction).await?;

    Ok(Json(extraction))
}

/// GET /api/v1/models - List configured models
async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.extractor.available_models(),
    })
}

/// GET /api/v1/extractions/:id - Fetch a saved extraction
async fn get_extraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Extraction>, AppError> {
    let id = ExtractionId::from_string(&id).map_err(AppError::BadRequest)?;

    state
        .repository
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Extraction {} not found", id)))
}

/// GET /health - Liveness check
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        model_count: state.extractor.available_models().len(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/v1/extract/:model", post(extract))
        .route("/api/v1/models", get(list_models))
        .route("/api/v1/extractions/:id", get(get_extraction))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use extracta_extractor::{ExtractorConfig, InMemoryExtractionRepository};
    use extracta_llm::MockProvider;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        let provider = MockProvider::new("gpt-4o", r#"{"name":"John"}"#);
        let extractor = Extractor::new(vec![Arc::new(provider)], ExtractorConfig::default()).unwrap();

        AppState {
            extractor: Arc::new(extractor),
            repository: Arc::new(InMemoryExtractionRepository::new()),
            token: Arc::from("test-token"),
        }
    }

    #[tokio::test]
    async fn test_health_check_needs_no_token() {
        let app = create_router(create_test_state());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_token_forms() {
        for (header_value, expected) in [
            (Some("test-token"), StatusCode::OK),
            (Some("Bearer test-token"), StatusCode::OK),
            (Some("Bearer wrong"), StatusCode::UNAUTHORIZED),
            (None, StatusCode::UNAUTHORIZED),
        ] {
            let app = create_router(create_test_state());
            let mut builder = Request::builder().uri("/api/v1/models");
            if let Some(value) = header_value {
                builder = builder.header("authorization", value);
            }

            let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
            assert_eq!(response.status(), expected, "header {:?}", header_value);
        }
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ExtractorError::UnsupportedModel("x".into()), StatusCode::NOT_FOUND),
            (ExtractorError::LoadFailed("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ExtractorError::TextTooLong(10, 5), StatusCode::PAYLOAD_TOO_LARGE),
            (ExtractorError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                ExtractorError::Llm(LlmError::UnsupportedMessage("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ExtractorError::Llm(LlmError::RateLimitExceeded),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ExtractorError::Llm(LlmError::Communication("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }
}
