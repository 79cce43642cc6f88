//! Analysis service. Orchestrates a full analysis run over the message corpus.
//!
//! Coordinates between the message store (corpus), the insight extractor
//! (topics, sentiment), the response-time aggregator and the record store.

use crate::domain::{
    AnalysisData, AnalysisOutcome, AnalysisRecord, DomainError, InsightKind, Message,
    response_time,
};
use crate::ports::{AnalysisLogPort, MessageStorePort};
use crate::usecases::InsightExtractor;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Service for running and persisting analyses.
///
/// Orchestrates the flow:
/// 1. Load every stored message ordered by timestamp
/// 2. Extract topics and sentiment concurrently, compute response times locally
/// 3. Package the three results as records with one creation timestamp
/// 4. Save all records in one transaction
///
/// Any failure aborts the run before anything is saved.
pub struct AnalysisService {
    extractor: Arc<InsightExtractor>,
    messages: Arc<dyn MessageStorePort>,
    log: Arc<dyn AnalysisLogPort>,
}

impl AnalysisService {
    /// Create a new analysis service.
    ///
    /// # Arguments
    /// * `extractor` - Insight extractor bound to a model adapter
    /// * `messages` - Message store providing the corpus
    /// * `log` - Record store implementing AnalysisLogPort
    pub fn new(
        extractor: Arc<InsightExtractor>,
        messages: Arc<dyn MessageStorePort>,
        log: Arc<dyn AnalysisLogPort>,
    ) -> Self {
        Self {
            extractor,
            messages,
            log,
        }
    }

    /// Analyze `messages` without touching the stores.
    ///
    /// Fails with `EmptyCorpus` when there is nothing to analyze and with
    /// `Extraction` when either model extraction fails; no partial outcome is returned.
    pub async fn run(&self, mut messages: Vec<Message>) -> Result<AnalysisOutcome, DomainError> {
        if messages.is_empty() {
            return Err(DomainError::EmptyCorpus);
        }

        messages.sort_by_key(|m| m.timestamp);
        info!(messages = messages.len(), "starting analysis run");

        let topics = async {
            self.extractor
                .extract_topics(&messages)
                .await
                .map_err(|source| DomainError::Extraction {
                    kind: InsightKind::Topics,
                    source,
                })
        };
        let sentiment = async {
            self.extractor
                .extract_sentiment(&messages)
                .await
                .map_err(|source| DomainError::Extraction {
                    kind: InsightKind::Sentiment,
                    source,
                })
        };
        let (topics, sentiment) = tokio::try_join!(topics, sentiment).inspect_err(|e| {
            warn!(error = %e, "analysis run aborted");
        })?;

        let response_time = response_time::compute(&messages);

        info!(
            topics = topics.topics.len(),
            sentiments = sentiment.sentiments.len(),
            authors = response_time.len(),
            "analysis run complete"
        );

        Ok(AnalysisOutcome {
            response_time,
            topics,
            sentiment,
        })
    }

    /// Package an outcome as topics, sentiment and response_time records sharing one `created_at`.
    pub fn package(outcome: AnalysisOutcome) -> Vec<AnalysisRecord> {
        let created_at = Utc::now();
        vec![
            AnalysisRecord::new(AnalysisData::Topics(outcome.topics), created_at),
            AnalysisRecord::new(AnalysisData::Sentiment(outcome.sentiment), created_at),
            AnalysisRecord::new(AnalysisData::ResponseTime(outcome.response_time), created_at),
        ]
    }

    /// Analyze the whole stored corpus and persist the three records together.
    ///
    /// Returns the saved records (with ids). Nothing is saved when any step fails.
    pub async fn analyze_corpus(&self) -> Result<Vec<AnalysisRecord>, DomainError> {
        let messages = self.messages.list_messages().await?;
        let outcome = self.run(messages).await?;
        let records = Self::package(outcome);
        let saved = self.log.save_records(records).await?;
        info!(records = saved.len(), "analysis records saved");
        Ok(saved)
    }

    /// Previously stored records, newest first.
    pub async fn latest_insights(&self) -> Result<Vec<AnalysisRecord>, DomainError> {
        self.log.list_records().await
    }
}
