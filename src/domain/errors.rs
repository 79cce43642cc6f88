//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::domain::InsightKind;
use std::fmt;
use thiserror::Error;

/// Maximum characters of raw model output kept in an error.
pub const RAW_EXCERPT_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No messages found. Import messages first.")]
    EmptyCorpus,

    #[error("{kind} extraction failed: {source}")]
    Extraction {
        kind: InsightKind,
        #[source]
        source: ExtractionError,
    },

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("UI error: {0}")]
    Ui(String),
}

impl DomainError {
    pub fn is_empty_corpus(&self) -> bool {
        matches!(self, DomainError::EmptyCorpus)
    }

    /// The model could not be reached or refused the request.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            DomainError::Extraction {
                source: ExtractionError::Transport(_),
                ..
            }
        )
    }

    /// The model answered, but not with the contracted shape.
    pub fn is_malformed_output(&self) -> bool {
        matches!(
            self,
            DomainError::Extraction {
                source: ExtractionError::Malformed(_),
                ..
            }
        )
    }
}

/// Failure of one extraction round trip.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("model call failed: {0}")]
    Transport(#[from] ModelError),

    #[error(transparent)]
    Malformed(#[from] MalformedOutputError),
}

/// Errors surfaced by a model provider (see `ModelPort`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider returned no content")]
    EmptyResponse,

    #[error("failed to parse provider response: {0}")]
    InvalidResponse(String),
}

/// Model output that does not satisfy the expected shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedOutputError {
    pub reason: String,
    /// JSON field path of the offending value, e.g. `sentiments[1].confidence`.
    pub path: Option<String>,
    pub raw_excerpt: String,
}

impl MalformedOutputError {
    pub fn new(reason: impl Into<String>, path: Option<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            path,
            raw_excerpt: raw.chars().take(RAW_EXCERPT_LEN).collect(),
        }
    }
}

impl fmt::Display for MalformedOutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "malformed model output at `{}`: {}", path, self.reason),
            None => write!(f, "malformed model output: {}", self.reason),
        }
    }
}

impl std::error::Error for MalformedOutputError {}
