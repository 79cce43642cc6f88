//! Validating parser for model output.
//!
//! Model responses are untrusted free text. The parser strips at most one
//! Markdown code fence at each end, decodes JSON, checks the contracted shape
//! field by field and only then deserializes into the typed value. Nothing is
//! repaired or defaulted: any violation fails the whole payload.

use crate::domain::{InsightKind, MalformedOutputError, Sentiment, SentimentSet, TopicSet};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;

const FENCE: &str = "```";

/// A shape violation found during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeViolation {
    pub reason: String,
    pub path: String,
}

impl ShapeViolation {
    fn new(reason: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            path: path.into(),
        }
    }
}

/// Contracted JSON shape of an extraction result: an object holding one array
/// under `ROOT`, every entry validated by `validate_entry`.
pub trait ResponseShape: DeserializeOwned + Send {
    const KIND: InsightKind;
    const ROOT: &'static str;

    fn validate_entry(entry: &Map<String, Value>, path: &str) -> Result<(), ShapeViolation>;
}

impl ResponseShape for TopicSet {
    const KIND: InsightKind = InsightKind::Topics;
    const ROOT: &'static str = "topics";

    fn validate_entry(entry: &Map<String, Value>, path: &str) -> Result<(), ShapeViolation> {
        require_str(entry, "name", path)?;
        require_str(entry, "description", path)?;
        if require(entry, "message_count", path)?.as_u64().is_none() {
            return Err(ShapeViolation::new(
                "expected a non-negative integer",
                field_path(path, "message_count"),
            ));
        }
        let channels_path = field_path(path, "channels");
        let channels = require(entry, "channels", path)?
            .as_array()
            .ok_or_else(|| ShapeViolation::new("expected an array of strings", &channels_path))?;
        let mut seen = HashSet::with_capacity(channels.len());
        for (i, channel) in channels.iter().enumerate() {
            let name = channel.as_str().ok_or_else(|| {
                ShapeViolation::new("expected a string", format!("{}[{}]", channels_path, i))
            })?;
            if !seen.insert(name) {
                return Err(ShapeViolation::new(
                    format!("duplicate channel {:?}", name),
                    format!("{}[{}]", channels_path, i),
                ));
            }
        }
        Ok(())
    }
}

impl ResponseShape for SentimentSet {
    const KIND: InsightKind = InsightKind::Sentiment;
    const ROOT: &'static str = "sentiments";

    fn validate_entry(entry: &Map<String, Value>, path: &str) -> Result<(), ShapeViolation> {
        require_str(entry, "author", path)?;

        let sentiment_path = field_path(path, "overall_sentiment");
        let label = require(entry, "overall_sentiment", path)?
            .as_str()
            .ok_or_else(|| ShapeViolation::new("expected a string", &sentiment_path))?;
        if !Sentiment::ALL.iter().any(|s| s.as_str() == label) {
            return Err(ShapeViolation::new(
                format!(
                    "expected one of positive, neutral, negative; got {:?}",
                    label
                ),
                sentiment_path,
            ));
        }

        let confidence_path = field_path(path, "confidence");
        let confidence = require(entry, "confidence", path)?
            .as_f64()
            .ok_or_else(|| ShapeViolation::new("expected a number", &confidence_path))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ShapeViolation::new(
                format!("expected a value in [0, 1]; got {}", confidence),
                confidence_path,
            ));
        }

        require_str(entry, "summary", path)?;
        Ok(())
    }
}

fn field_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn require<'a>(
    entry: &'a Map<String, Value>,
    field: &str,
    path: &str,
) -> Result<&'a Value, ShapeViolation> {
    entry
        .get(field)
        .ok_or_else(|| ShapeViolation::new("missing required field", field_path(path, field)))
}

fn require_str(entry: &Map<String, Value>, field: &str, path: &str) -> Result<(), ShapeViolation> {
    if require(entry, field, path)?.is_string() {
        Ok(())
    } else {
        Err(ShapeViolation::new(
            "expected a string",
            field_path(path, field),
        ))
    }
}

/// Remove one leading fence line (```` ``` ```` plus optional language tag) and
/// one trailing fence. Text without fences is returned trimmed.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
            .unwrap_or(rest.len());
        let rest = rest[tag_len..].trim_start_matches([' ', '\t']);
        text = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// Check the decoded value against `S`'s contracted shape.
pub fn validate<S: ResponseShape>(value: &Value) -> Result<(), ShapeViolation> {
    let root = value
        .as_object()
        .ok_or_else(|| ShapeViolation::new("expected a JSON object", "$"))?;
    let entries = root
        .get(S::ROOT)
        .ok_or_else(|| ShapeViolation::new("missing required field", S::ROOT))?
        .as_array()
        .ok_or_else(|| ShapeViolation::new("expected an array", S::ROOT))?;

    for (i, entry) in entries.iter().enumerate() {
        let path = format!("{}[{}]", S::ROOT, i);
        let obj = entry
            .as_object()
            .ok_or_else(|| ShapeViolation::new("expected an object", &path))?;
        S::validate_entry(obj, &path)?;
    }
    Ok(())
}

/// Parse raw model output into `S`, failing with `MalformedOutputError` when it
/// is not JSON or does not match the shape.
pub fn parse<S: ResponseShape>(raw: &str) -> Result<S, MalformedOutputError> {
    let body = strip_fences(raw);

    let value: Value = serde_json::from_str(body)
        .map_err(|_| MalformedOutputError::new("invalid JSON", None, raw))?;

    validate::<S>(&value)
        .map_err(|v| MalformedOutputError::new(v.reason, Some(v.path), raw))?;

    serde_json::from_value(value).map_err(|e| {
        MalformedOutputError::new(
            format!("does not match `{}` shape: {}", S::ROOT, e),
            None,
            raw,
        )
    })
}
