//! Ingest use case: put imported messages into the store.

use crate::domain::{DomainError, ImportSummary, Message};
use crate::ports::MessageStorePort;
use std::sync::Arc;
use tracing::info;

pub struct IngestService {
    store: Arc<dyn MessageStorePort>,
}

impl IngestService {
    pub fn new(store: Arc<dyn MessageStorePort>) -> Self {
        Self { store }
    }

    /// Save `messages`. Messages already stored with the same
    /// (channel, author, content, timestamp) are skipped.
    pub async fn import(&self, messages: &[Message]) -> Result<ImportSummary, DomainError> {
        let inserted = self.store.save_messages(messages).await?;
        let summary = ImportSummary {
            received: messages.len(),
            inserted,
        };
        info!(
            received = summary.received,
            inserted = summary.inserted,
            duplicates = summary.duplicates(),
            "messages imported"
        );
        Ok(summary)
    }

    pub async fn list_messages(&self) -> Result<Vec<Message>, DomainError> {
        self.store.list_messages().await
    }
}
