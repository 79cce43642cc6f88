//! AI adapter module. Implements ModelPort for LLM providers.
//!
//! Provides OpenAI-compatible and Anthropic adapters, plus a mock adapter for offline runs.

pub mod anthropic_adapter;
pub mod mock_adapter;
pub mod openai_adapter;

pub use anthropic_adapter::AnthropicAdapter;
pub use mock_adapter::MockAiAdapter;
pub use openai_adapter::OpenAiAdapter;

use crate::domain::ModelError;
use std::time::Duration;
use tracing::warn;

/// Maximum characters of an error body carried into `ModelError::Api`.
const ERROR_BODY_LEN: usize = 200;

/// HTTP client with a request timeout. Falls back to the default client if the builder fails.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Map a non-success HTTP status to `ModelError`. 429 is reported as `RateLimited`.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ModelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %text, "AI API returned error");

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ModelError::RateLimited);
    }
    Err(ModelError::Api {
        status: status.as_u16(),
        body: text.chars().take(ERROR_BODY_LEN).collect(),
    })
}
