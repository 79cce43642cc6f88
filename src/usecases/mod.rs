//! Application use cases. Orchestrate domain logic via ports.

pub mod analysis_service;
pub mod ingest_service;
pub mod insight_extractor;
pub mod prompt_builder;
pub mod report;
pub mod response_parser;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis_service::AnalysisService;
pub use ingest_service::IngestService;
pub use insight_extractor::InsightExtractor;
pub use response_parser::ResponseShape;
