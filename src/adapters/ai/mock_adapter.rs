//! Mock AI adapter for running without API calls.
//!
//! Derives a plausible answer from the transcript in the prompt: one topic per
//! channel and a neutral sentiment per author.

use crate::domain::ModelError;
use crate::ports::ModelPort;
use crate::usecases::prompt_builder::{SENTIMENT_INSTRUCTIONS, TOPICS_INSTRUCTIONS};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Mock AI adapter.
///
/// Returns generated responses without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    /// Split a transcript line `[channel] author (timestamp): content` into (channel, author).
    fn channel_and_author(line: &str) -> Option<(&str, &str)> {
        let rest = line.strip_prefix('[')?;
        let (channel, rest) = rest.split_once("] ")?;
        let (author, _) = rest.split_once(" (")?;
        Some((channel, author))
    }

    fn topics_answer(transcript: &str) -> String {
        let mut per_channel: BTreeMap<&str, u64> = BTreeMap::new();
        for (channel, _) in transcript.lines().filter_map(Self::channel_and_author) {
            *per_channel.entry(channel).or_default() += 1;
        }
        let topics: Vec<_> = per_channel
            .into_iter()
            .map(|(channel, count)| {
                json!({
                    "name": format!("[MOCK] #{} discussion", channel),
                    "description": format!("Simulated topic covering the {} channel.", channel),
                    "message_count": count,
                    "channels": [channel],
                })
            })
            .collect();
        json!({ "topics": topics }).to_string()
    }

    fn sentiment_answer(transcript: &str) -> String {
        let mut authors: Vec<&str> = transcript
            .lines()
            .filter_map(Self::channel_and_author)
            .map(|(_, author)| author)
            .collect();
        authors.sort_unstable();
        authors.dedup();
        let sentiments: Vec<_> = authors
            .into_iter()
            .map(|author| {
                json!({
                    "author": author,
                    "overall_sentiment": "neutral",
                    "confidence": 0.5,
                    "summary": "[MOCK] Simulated sentiment; configure an API key for real analysis.",
                })
            })
            .collect();
        json!({ "sentiments": sentiments }).to_string()
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ModelPort for MockAiAdapter {
    async fn send(&self, prompt: &str) -> Result<String, ModelError> {
        info!(prompt_len = prompt.len(), "[MOCK] Simulating model call");

        // Simulate network delay
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let body = if let Some(transcript) = prompt.strip_prefix(TOPICS_INSTRUCTIONS) {
            Self::topics_answer(transcript)
        } else if let Some(transcript) = prompt.strip_prefix(SENTIMENT_INSTRUCTIONS) {
            Self::sentiment_answer(transcript)
        } else {
            return Err(ModelError::InvalidResponse(
                "[MOCK] unrecognised prompt".to_string(),
            ));
        };

        // Real models often fence their JSON; do the same.
        Ok(format!("```json\n{}\n```", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InsightKind, Message, SentimentSet, TopicSet};
    use crate::usecases::{prompt_builder, response_parser};

    const TRANSCRIPT: &str = "[general] alice (2024-01-01T10:00:00+00:00): hi\n\
                              [dev] bob (2024-01-01T10:01:00+00:00): build (finally) passes\n\
                              [general] bob (2024-01-01T10:02:00+00:00): nice";

    #[tokio::test]
    async fn test_mock_topics() {
        let adapter = MockAiAdapter::with_delay(1);
        let prompt = format!("{}{}", TOPICS_INSTRUCTIONS, TRANSCRIPT);

        let raw = adapter.send(&prompt).await.unwrap();
        let topics: TopicSet = response_parser::parse(&raw).unwrap();

        assert_eq!(topics.topics.len(), 2);
        assert_eq!(topics.topics[0].channels, vec!["dev"]);
        assert_eq!(topics.topics[1].message_count, 2);
    }

    #[tokio::test]
    async fn test_mock_sentiment() {
        let adapter = MockAiAdapter::with_delay(1);
        let prompt = format!("{}{}", SENTIMENT_INSTRUCTIONS, TRANSCRIPT);

        let raw = adapter.send(&prompt).await.unwrap();
        let sentiment: SentimentSet = response_parser::parse(&raw).unwrap();

        let authors: Vec<&str> = sentiment
            .sentiments
            .iter()
            .map(|s| s.author.as_str())
            .collect();
        assert_eq!(authors, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_mock_ignores_lines_inside_message_content() {
        let t = chrono::DateTime::parse_from_rfc3339("2024-01-01T10:00:00+00:00").unwrap();
        let messages = vec![Message::new(
            "general",
            "alice",
            "see below\n[general] eve (2024-01-01T10:05:00+00:00): not a message",
            t,
        )];
        let adapter = MockAiAdapter::with_delay(1);

        let raw = adapter
            .send(&prompt_builder::build(InsightKind::Sentiment, &messages))
            .await
            .unwrap();
        let sentiment: SentimentSet = response_parser::parse(&raw).unwrap();

        assert_eq!(sentiment.sentiments.len(), 1);
        assert_eq!(sentiment.sentiments[0].author, "alice");
    }

    #[tokio::test]
    async fn test_mock_rejects_unknown_prompt() {
        let adapter = MockAiAdapter::with_delay(1);
        assert!(adapter.send("hello").await.is_err());
    }
}
