//! HTTP plumbing shared by the provider adapters

use crate::LlmError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for provider requests
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))
}

/// Send `body` as JSON and decode the provider envelope
///
/// No retries: every call reaches the provider at most once.
pub(crate) async fn post_json<B, R>(
    request: reqwest::RequestBuilder,
    body: &B,
    model: &str,
) -> Result<R, LlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

    let status = response.status();
    debug!("Provider responded with HTTP {}", status);

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(LlmError::ModelNotAvailable(model.to_string()));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimitExceeded);
    }
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

pub(crate) fn trim_endpoint(endpoint: impl Into<String>) -> String {
    let mut endpoint = endpoint.into();
    while endpoint.ends_with('/') {
        endpoint.pop();
    }
    endpoint
}
