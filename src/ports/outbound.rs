//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AnalysisRecord, DomainError, Message, ModelError};

/// Language-model capability: one prompt in, one response text out.
///
/// Implementations do not retry; a failed round trip is reported as-is.
#[async_trait::async_trait]
pub trait ModelPort: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Message store. Source of the analysis corpus.
#[async_trait::async_trait]
pub trait MessageStorePort: Send + Sync {
    /// Insert messages, skipping any whose (channel, author, content, timestamp)
    /// already exists. Returns the number of rows actually inserted.
    async fn save_messages(&self, messages: &[Message]) -> Result<usize, DomainError>;

    /// All stored messages ordered by timestamp ascending.
    async fn list_messages(&self) -> Result<Vec<Message>, DomainError>;
}

/// Analysis record store.
#[async_trait::async_trait]
pub trait AnalysisLogPort: Send + Sync {
    /// Persist all records in one transaction. Either every record is stored
    /// (and returned with its id) or none is.
    async fn save_records(
        &self,
        records: Vec<AnalysisRecord>,
    ) -> Result<Vec<AnalysisRecord>, DomainError>;

    /// Stored records, newest first.
    async fn list_records(&self) -> Result<Vec<AnalysisRecord>, DomainError>;
}
