//! Anthropic Messages API adapter for the model port.

use crate::adapters::ai::{error_for_status, http_client};
use crate::domain::ModelError;
use crate::ports::ModelPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicAdapter {
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            api_url,
            api_key,
            model,
            max_tokens,
        }
    }

    fn request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![UserMessage {
                role: "user",
                content: prompt,
            }],
        }
    }

    /// Text of the first `text` content block.
    fn first_text(response: MessagesResponse) -> Result<String, ModelError> {
        response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<UserMessage<'a>>,
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[async_trait::async_trait]
impl ModelPort for AnthropicAdapter {
    async fn send(&self, prompt: &str) -> Result<String, ModelError> {
        info!(
            model = %self.model,
            prompt_len = prompt.len(),
            "sending prompt to Anthropic API"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let response = error_for_status(response).await?;

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let text = Self::first_text(body)?;
        debug!(raw_len = text.len(), "received Anthropic response");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> AnthropicAdapter {
        AnthropicAdapter::new(
            DEFAULT_ANTHROPIC_URL.to_string(),
            "key".to_string(),
            DEFAULT_ANTHROPIC_MODEL.to_string(),
            1024,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_request_shape() {
        let adapter = adapter();
        let body = serde_json::to_value(adapter.request("analyze this")).unwrap();
        assert_eq!(body["model"], DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["content"], "analyze this");
    }

    #[test]
    fn test_first_text_block() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"id":"msg_1","content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"{\"sentiments\":[]}"}]}"#,
        )
        .unwrap();
        assert_eq!(
            AnthropicAdapter::first_text(body).unwrap(),
            r#"{"sentiments":[]}"#
        );

        let none: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(
            AnthropicAdapter::first_text(none).unwrap_err(),
            ModelError::EmptyResponse
        );
    }
}
