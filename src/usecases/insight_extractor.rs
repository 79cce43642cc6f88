//! Insight extraction: build prompt, one model round trip, validate the answer.
//!
//! No retries or caching here. A transport failure or a malformed answer is
//! returned to the caller as `ExtractionError`.

use crate::domain::{ExtractionError, Message, SentimentSet, TopicSet};
use crate::ports::ModelPort;
use crate::usecases::prompt_builder;
use crate::usecases::response_parser::{self, ResponseShape};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct InsightExtractor {
    model: Arc<dyn ModelPort>,
}

impl InsightExtractor {
    pub fn new(model: Arc<dyn ModelPort>) -> Self {
        Self { model }
    }

    pub async fn extract_topics(&self, messages: &[Message]) -> Result<TopicSet, ExtractionError> {
        self.extract::<TopicSet>(messages).await
    }

    pub async fn extract_sentiment(
        &self,
        messages: &[Message],
    ) -> Result<SentimentSet, ExtractionError> {
        self.extract::<SentimentSet>(messages).await
    }

    /// Run one extraction of kind `S::KIND` over `messages` (expected in timestamp order).
    pub async fn extract<S: ResponseShape>(
        &self,
        messages: &[Message],
    ) -> Result<S, ExtractionError> {
        let kind = S::KIND;
        let prompt = prompt_builder::build(kind, messages);
        info!(
            kind = %kind,
            messages = messages.len(),
            prompt_len = prompt.len(),
            "sending extraction prompt"
        );

        let raw = self.model.send(&prompt).await.map_err(|e| {
            warn!(kind = %kind, error = %e, "model call failed");
            ExtractionError::Transport(e)
        })?;
        debug!(kind = %kind, raw_len = raw.len(), "received model response");

        let parsed = response_parser::parse::<S>(&raw).map_err(|e| {
            warn!(
                kind = %kind,
                reason = %e.reason,
                path = e.path.as_deref().unwrap_or("-"),
                excerpt = %e.raw_excerpt,
                "model output rejected"
            );
            ExtractionError::Malformed(e)
        })?;

        info!(kind = %kind, "extraction complete");
        Ok(parsed)
    }
}
