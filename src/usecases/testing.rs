//! In-memory port fakes shared by use-case tests.

use crate::domain::{AnalysisRecord, DomainError, InsightKind, Message, ModelError};
use crate::ports::{AnalysisLogPort, MessageStorePort, ModelPort};
use crate::usecases::prompt_builder;
use chrono::{DateTime, Duration, FixedOffset};
use std::collections::HashMap;
use std::sync::Mutex;

fn kind_of(prompt: &str) -> InsightKind {
    if prompt.starts_with(prompt_builder::TOPICS_INSTRUCTIONS) {
        InsightKind::Topics
    } else {
        InsightKind::Sentiment
    }
}

/// Model fake answering per insight kind, recognised from the prompt header.
#[derive(Default)]
pub struct ScriptedModel {
    answers: Mutex<HashMap<InsightKind, Result<String, ModelError>>>,
    prompts: Mutex<Vec<(InsightKind, String)>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(self, kind: InsightKind, answer: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(kind, Ok(answer.to_string()));
        self
    }

    pub fn with_failure(self, kind: InsightKind, error: ModelError) -> Self {
        self.answers.lock().unwrap().insert(kind, Err(error));
        self
    }

    pub fn calls(&self, kind: InsightKind) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn last_prompt(&self, kind: InsightKind) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.clone())
    }
}

#[async_trait::async_trait]
impl ModelPort for ScriptedModel {
    async fn send(&self, prompt: &str) -> Result<String, ModelError> {
        let kind = kind_of(prompt);
        self.prompts
            .lock()
            .unwrap()
            .push((kind, prompt.to_string()));
        self.answers
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or(Err(ModelError::EmptyResponse))
    }
}

/// In-memory message and record store with optional write failure.
#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
    records: Mutex<Vec<AnalysisRecord>>,
    fail_record_writes: bool,
}

impl MemoryStore {
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
            ..Self::default()
        }
    }

    pub fn failing_record_writes(mut self) -> Self {
        self.fail_record_writes = true;
        self
    }

    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MessageStorePort for MemoryStore {
    async fn save_messages(&self, messages: &[Message]) -> Result<usize, DomainError> {
        let mut stored = self.messages.lock().unwrap();
        let mut inserted = 0;
        for m in messages {
            if !stored.contains(m) {
                stored.push(m.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, DomainError> {
        let mut messages = self.messages.lock().unwrap().clone();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}

#[async_trait::async_trait]
impl AnalysisLogPort for MemoryStore {
    async fn save_records(
        &self,
        records: Vec<AnalysisRecord>,
    ) -> Result<Vec<AnalysisRecord>, DomainError> {
        if self.fail_record_writes {
            return Err(DomainError::Repo("disk full".to_string()));
        }
        let mut stored = self.records.lock().unwrap();
        let saved: Vec<AnalysisRecord> = records
            .into_iter()
            .map(|mut r| {
                r.id = Some(stored.len() as i64 + 1);
                stored.push(r.clone());
                r
            })
            .collect();
        Ok(saved)
    }

    async fn list_records(&self) -> Result<Vec<AnalysisRecord>, DomainError> {
        let mut records = self.records.lock().unwrap().clone();
        records.reverse();
        Ok(records)
    }
}

pub fn t0() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-03-01T09:00:00+00:00").unwrap()
}

/// alice / bob / alice in `general`, 0, +5 and +8 minutes.
pub fn sample_corpus() -> Vec<Message> {
    vec![
        Message::new("general", "alice", "hi", t0()),
        Message::new("general", "bob", "hey", t0() + Duration::minutes(5)),
        Message::new("general", "alice", "bye", t0() + Duration::minutes(8)),
    ]
}

pub const TOPICS_ANSWER: &str = r#"{"topics":[{"name":"Greetings","description":"Small talk","message_count":3,"channels":["general"]}]}"#;

pub const SENTIMENT_ANSWER: &str = r#"```json
{"sentiments":[
  {"author":"alice","overall_sentiment":"positive","confidence":0.9,"summary":"Friendly"},
  {"author":"bob","overall_sentiment":"neutral","confidence":0.7,"summary":"Brief"}
]}
```"#;
