//! insight-extractor: topics, sentiment and response times from channel messages,
//! with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
