//! Application configuration. Data paths, model provider credentials.

use crate::adapters::ai::anthropic_adapter::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_ANTHROPIC_URL};
use crate::adapters::ai::openai_adapter::{DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL};
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which model adapter to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Anthropic,
    Mock,
}

impl AiProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(AiProvider::OpenAi),
            "anthropic" | "claude" => Some(AiProvider::Anthropic),
            "mock" => Some(AiProvider::Mock),
            _ => None,
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Anthropic => "anthropic",
            AiProvider::Mock => "mock",
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory for insights.db and reports. Read from INSIGHTS_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// "openai", "anthropic" or "mock". Read from INSIGHTS_AI_PROVIDER.
    #[serde(default)]
    pub ai_provider: Option<String>,

    /// API key. Read from INSIGHTS_AI_API_KEY; falls back to ANTHROPIC_API_KEY / OPENAI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Endpoint URL. Defaults per provider. Read from INSIGHTS_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// Model name. Defaults per provider. Read from INSIGHTS_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Max output tokens (Anthropic). Read from INSIGHTS_AI_MAX_TOKENS.
    #[serde(default)]
    pub ai_max_tokens: Option<u32>,

    /// HTTP timeout per model call, in seconds. Read from INSIGHTS_AI_TIMEOUT_SECS.
    #[serde(default)]
    pub ai_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("INSIGHTS").try_parsing(true));
        if let Ok(path) = std::env::var("INSIGHTS_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    /// Provider from config, or inferred from which API key is present. Unknown names fall back to mock.
    pub fn ai_provider(&self) -> AiProvider {
        if let Some(name) = &self.ai_provider {
            return AiProvider::parse(name).unwrap_or(AiProvider::Mock);
        }
        if std::env::var("ANTHROPIC_API_KEY").is_ok() {
            AiProvider::Anthropic
        } else if std::env::var("OPENAI_API_KEY").is_ok() {
            AiProvider::OpenAi
        } else if self.ai_api_key.is_some() {
            AiProvider::OpenAi
        } else {
            AiProvider::Mock
        }
    }

    /// API key for the selected provider.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| match self.ai_provider() {
                AiProvider::Anthropic => std::env::var("ANTHROPIC_API_KEY").ok(),
                AiProvider::OpenAi => std::env::var("OPENAI_API_KEY").ok(),
                AiProvider::Mock => None,
            })
    }

    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url.clone().unwrap_or_else(|| {
            match self.ai_provider() {
                AiProvider::Anthropic => DEFAULT_ANTHROPIC_URL,
                _ => DEFAULT_OPENAI_URL,
            }
            .to_string()
        })
    }

    pub fn ai_model_or_default(&self) -> String {
        self.ai_model.clone().unwrap_or_else(|| {
            match self.ai_provider() {
                AiProvider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
                _ => DEFAULT_OPENAI_MODEL,
            }
            .to_string()
        })
    }

    pub fn ai_max_tokens_or_default(&self) -> u32 {
        self.ai_max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn ai_timeout_secs_or_default(&self) -> u64 {
        self.ai_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(AiProvider::parse("OpenAI"), Some(AiProvider::OpenAi));
        assert_eq!(AiProvider::parse(" claude "), Some(AiProvider::Anthropic));
        assert_eq!(AiProvider::parse("gemini"), None);
    }

    #[test]
    fn test_explicit_provider_defaults() {
        let cfg = AppConfig {
            ai_provider: Some("anthropic".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.ai_provider(), AiProvider::Anthropic);
        assert_eq!(cfg.ai_api_url_or_default(), DEFAULT_ANTHROPIC_URL);
        assert_eq!(cfg.ai_model_or_default(), DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(cfg.ai_max_tokens_or_default(), 1024);

        let cfg = AppConfig {
            ai_provider: Some("openai".to_string()),
            ai_model: Some("llama3.2".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.ai_api_url_or_default(), DEFAULT_OPENAI_URL);
        assert_eq!(cfg.ai_model_or_default(), "llama3.2");
        assert_eq!(cfg.data_dir_or_default(), DEFAULT_DATA_DIR);
    }
}
