//! Markdown digest of analysis records.

use crate::domain::{AnalysisData, AnalysisRecord, DomainError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Render records (usually the three from one run) as a Markdown digest.
pub fn render_markdown(records: &[AnalysisRecord]) -> String {
    let mut md = String::new();

    md.push_str("# Communication Insights\n\n");
    if let Some(first) = records.first() {
        md.push_str(&format!(
            "**Analyzed:** {}\n\n",
            first.created_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    md.push_str("---\n\n");

    for record in records {
        match &record.result_data {
            AnalysisData::Topics(set) => {
                md.push_str("## Topics\n\n");
                if set.topics.is_empty() {
                    md.push_str("_No topics found._\n");
                }
                for topic in &set.topics {
                    md.push_str(&format!(
                        "- **{}** ({} messages; {}): {}\n",
                        topic.name,
                        topic.message_count,
                        topic.channels.join(", "),
                        topic.description
                    ));
                }
                md.push('\n');
            }
            AnalysisData::Sentiment(set) => {
                md.push_str("## Sentiment\n\n");
                if set.sentiments.is_empty() {
                    md.push_str("_No authors scored._\n");
                }
                for s in &set.sentiments {
                    md.push_str(&format!(
                        "- **{}**: {} ({:.0}%) - {}\n",
                        s.author,
                        s.overall_sentiment,
                        s.confidence * 100.0,
                        s.summary
                    ));
                }
                md.push('\n');
            }
            AnalysisData::ResponseTime(summary) => {
                md.push_str("## Response Times (minutes)\n\n");
                md.push_str("| Author | Avg | Min | Max | Responses |\n");
                md.push_str("|---|---|---|---|---|\n");
                for (author, stats) in summary {
                    md.push_str(&format!(
                        "| {} | {} | {} | {} | {} |\n",
                        author,
                        stats.avg_response_minutes,
                        stats.min_response_minutes,
                        stats.max_response_minutes,
                        stats.total_responses
                    ));
                }
                md.push('\n');
            }
        }
    }

    md.push_str("---\n");
    md.push_str("*Generated by insight-extractor*\n");
    md
}

/// Write the digest to `dir/insights_<timestamp>.md` and return its path.
pub async fn write_report(dir: &Path, records: &[AnalysisRecord]) -> Result<PathBuf, DomainError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| DomainError::Report(format!("Failed to create reports dir: {}", e)))?;

    let stamp = records
        .first()
        .map(|r| r.created_at.format("%Y%m%d_%H%M%S").to_string())
        .unwrap_or_else(|| "empty".to_string());
    let path = dir.join(format!("insights_{}.md", stamp));

    fs::write(&path, render_markdown(records))
        .await
        .map_err(|e| DomainError::Report(format!("Failed to write report: {}", e)))?;

    info!(path = %path.display(), "report generated");
    Ok(path)
}
