//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod response_time;

pub use entities::{
    AnalysisData, AnalysisKind, AnalysisOutcome, AnalysisRecord, AuthorSentiment, ImportSummary,
    InsightKind, Message, ResponseTimeStats, ResponseTimeSummary, Sentiment, SentimentSet, Topic,
    TopicSet,
};
pub use errors::{DomainError, ExtractionError, MalformedOutputError, ModelError};
