//! Domain entities. Pure data structures for the core business.
//!
//! No storage/HTTP types here — adapters map their rows and payloads into these.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single channel-scoped message. Identity for deduplication is the full
/// (channel, author, content, timestamp) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel: String,
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl Message {
    pub fn new(
        channel: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            channel: channel.into(),
            author: author.into(),
            content: content.into(),
            timestamp,
        }
    }
}

/// Latency statistics for one author, in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub avg_response_minutes: f64,
    pub min_response_minutes: f64,
    pub max_response_minutes: f64,
    pub total_responses: u64,
}

/// Author -> latency statistics. Authors with no gap samples are absent.
pub type ResponseTimeSummary = BTreeMap<String, ResponseTimeStats>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub description: String,
    pub message_count: u64,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicSet {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSentiment {
    pub author: String,
    pub overall_sentiment: Sentiment,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSet {
    pub sentiments: Vec<AuthorSentiment>,
}

/// Kind of a persisted analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Topics,
    Sentiment,
    ResponseTime,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Topics => "topics",
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::ResponseTime => "response_time",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "topics" => Some(AnalysisKind::Topics),
            "sentiment" => Some(AnalysisKind::Sentiment),
            "response_time" => Some(AnalysisKind::ResponseTime),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two extractions that go through the language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Topics,
    Sentiment,
}

impl InsightKind {
    pub fn analysis_kind(&self) -> AnalysisKind {
        match self {
            InsightKind::Topics => AnalysisKind::Topics,
            InsightKind::Sentiment => AnalysisKind::Sentiment,
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.analysis_kind().as_str())
    }
}

/// Payload of an analysis record. Serialized without a tag; the kind travels
/// next to it as `analysis_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisData {
    Topics(TopicSet),
    Sentiment(SentimentSet),
    ResponseTime(ResponseTimeSummary),
}

impl AnalysisData {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisData::Topics(_) => AnalysisKind::Topics,
            AnalysisData::Sentiment(_) => AnalysisKind::Sentiment,
            AnalysisData::ResponseTime(_) => AnalysisKind::ResponseTime,
        }
    }

    /// Rebuild a payload from its stored JSON, using the stored kind to pick the shape.
    pub fn from_json(
        kind: AnalysisKind,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            AnalysisKind::Topics => AnalysisData::Topics(serde_json::from_value(value)?),
            AnalysisKind::Sentiment => AnalysisData::Sentiment(serde_json::from_value(value)?),
            AnalysisKind::ResponseTime => {
                AnalysisData::ResponseTime(serde_json::from_value(value)?)
            }
        })
    }
}

/// A persisted analysis result. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub analysis_type: AnalysisKind,
    pub result_data: AnalysisData,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(result_data: AnalysisData, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            analysis_type: result_data.kind(),
            result_data,
            created_at,
        }
    }
}

/// Joined result of one analysis run, before packaging into records.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub response_time: ResponseTimeSummary,
    pub topics: TopicSet,
    pub sentiment: SentimentSet,
}

/// Result of importing a batch of messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub received: usize,
    pub inserted: usize,
}

impl ImportSummary {
    pub fn duplicates(&self) -> usize {
        self.received.saturating_sub(self.inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_follows_data() {
        let record = AnalysisRecord::new(AnalysisData::Topics(TopicSet::default()), Utc::now());
        assert_eq!(record.analysis_type, AnalysisKind::Topics);
        assert!(record.id.is_none());
    }

    #[test]
    fn test_analysis_data_serializes_untagged() {
        let data = AnalysisData::Sentiment(SentimentSet {
            sentiments: vec![AuthorSentiment {
                author: "alice".to_string(),
                overall_sentiment: Sentiment::Positive,
                confidence: 0.8,
                summary: "Upbeat".to_string(),
            }],
        });
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["sentiments"][0]["overall_sentiment"], "positive");

        let back = AnalysisData::from_json(AnalysisKind::Sentiment, json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_analysis_kind_parse() {
        assert_eq!(
            AnalysisKind::parse("response_time"),
            Some(AnalysisKind::ResponseTime)
        );
        assert_eq!(AnalysisKind::parse("weekly"), None);
        assert_eq!(InsightKind::Sentiment.to_string(), "sentiment");
    }
}
