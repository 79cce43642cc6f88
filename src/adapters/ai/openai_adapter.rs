//! OpenAI-compatible adapter for the model port.
//!
//! Supports OpenAI API, Azure OpenAI, and local Ollama instances.
//! Returns the raw assistant text; validation happens in the use case layer.

use crate::adapters::ai::{error_for_status, http_client};
use crate::domain::ModelError;
use crate::ports::ModelPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible model adapter.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    /// * `timeout` - Per-request timeout
    pub fn new(api_url: String, api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            api_url,
            api_key,
            model,
        }
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.2,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }

    /// Text of the first choice, if any.
    fn first_choice(response: ChatResponse) -> Result<String, ModelError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

#[async_trait::async_trait]
impl ModelPort for OpenAiAdapter {
    async fn send(&self, prompt: &str) -> Result<String, ModelError> {
        info!(
            model = %self.model,
            prompt_len = prompt.len(),
            "sending prompt to OpenAI-compatible API"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let response = error_for_status(response).await?;

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let text = Self::first_choice(chat_response)?;
        debug!(raw_len = text.len(), "received OpenAI response");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> OpenAiAdapter {
        OpenAiAdapter::new(
            "http://localhost:11434/v1/chat/completions".to_string(),
            String::new(),
            "llama3.2".to_string(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(adapter().request("hello")).unwrap();
        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_first_choice() {
        let ok: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"topics\":[]}"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            OpenAiAdapter::first_choice(ok).unwrap(),
            r#"{"topics":[]}"#
        );

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(
            OpenAiAdapter::first_choice(empty).unwrap_err(),
            ModelError::EmptyResponse
        );

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(OpenAiAdapter::first_choice(null).is_err());
    }
}
