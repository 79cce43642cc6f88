//! Implements InputPort. Inquire-based interactive menu.
//!
//! Import a message file, run an analysis, browse stored insights.

use crate::adapters::import;
use crate::adapters::ui::progress;
use crate::domain::{AnalysisRecord, DomainError};
use crate::ports::InputPort;
use crate::usecases::{AnalysisService, IngestService, report};
use async_trait::async_trait;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Select, Text};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

const MENU_IMPORT: &str = "Import messages (JSON / CSV)";
const MENU_ANALYZE: &str = "Run analysis";
const MENU_INSIGHTS: &str = "Show latest insights";
const MENU_MESSAGES: &str = "Show recent messages";
const MENU_EXIT: &str = "Exit";

/// How many messages "Show recent messages" prints.
const RECENT_MESSAGES: usize = 20;

/// Applies the neon prompt theme to all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightMagenta))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(Color::LightCyan));
    inquire::set_global_render_config(config);
}

/// Records of the most recent run: all records sharing the newest `created_at`.
/// Expects `records` newest first, as returned by the store.
pub fn latest_run(records: &[AnalysisRecord]) -> Vec<AnalysisRecord> {
    let Some(newest) = records.first().map(|r| r.created_at) else {
        return Vec::new();
    };
    let mut run: Vec<AnalysisRecord> = records
        .iter()
        .filter(|r| r.created_at == newest)
        .cloned()
        .collect();
    run.sort_by_key(|r| r.id);
    run
}

/// Remediation hint for a failed analysis, by error kind.
pub fn failure_hint(err: &DomainError) -> &'static str {
    if err.is_empty_corpus() {
        "Import messages first, then run the analysis again."
    } else if err.is_model_unavailable() {
        "The model provider could not be reached. Retry in a moment."
    } else if err.is_malformed_output() {
        "The model returned output that does not match the expected format. Retry, or try another model."
    } else {
        "Check the logs for details."
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    ingest: Arc<IngestService>,
    analysis: Arc<AnalysisService>,
    reports_dir: PathBuf,
}

impl TuiInputPort {
    pub fn new(
        ingest: Arc<IngestService>,
        analysis: Arc<AnalysisService>,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            ingest,
            analysis,
            reports_dir,
        }
    }

    async fn import_flow(&self) -> Result<(), DomainError> {
        let path = Text::new("Path to messages file:")
            .with_help_message("JSON array or CSV with channel,author,content,timestamp")
            .prompt()
            .map_err(|e| DomainError::Ui(e.to_string()))?;
        let messages = import::load_messages(Path::new(path.trim())).await?;
        let summary = self.ingest.import(&messages).await?;
        println!(
            "Imported {} of {} messages ({} already stored).",
            summary.inserted,
            summary.received,
            summary.duplicates()
        );
        Ok(())
    }

    async fn analyze_flow(&self) -> Result<(), DomainError> {
        let pb = progress::spinner("Analyzing messages...");
        let result = self.analysis.analyze_corpus().await;
        pb.finish_and_clear();

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                println!("Analysis failed: {}", e);
                println!("{}", failure_hint(&e));
                return Ok(());
            }
        };

        println!("{}", report::render_markdown(&records));
        let path = report::write_report(&self.reports_dir, &records).await?;
        println!("Report saved to {}", path.display());
        Ok(())
    }

    async fn insights_flow(&self) -> Result<(), DomainError> {
        let records = self.analysis.latest_insights().await?;
        let run = latest_run(&records);
        if run.is_empty() {
            println!("No insights yet. Run an analysis first.");
        } else {
            println!("{}", report::render_markdown(&run));
        }
        Ok(())
    }

    async fn messages_flow(&self) -> Result<(), DomainError> {
        let messages = self.ingest.list_messages().await?;
        println!("{} messages stored.", messages.len());
        let skip = messages.len().saturating_sub(RECENT_MESSAGES);
        for m in &messages[skip..] {
            println!(
                "[{}] {} ({}): {}",
                m.channel,
                m.author,
                m.timestamp.format("%Y-%m-%d %H:%M"),
                m.content
            );
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let options = vec![
                MENU_IMPORT,
                MENU_ANALYZE,
                MENU_INSIGHTS,
                MENU_MESSAGES,
                MENU_EXIT,
            ];
            let choice = match Select::new("What would you like to do?", options).prompt() {
                Ok(choice) => choice,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                }
                Err(e) => return Err(DomainError::Ui(e.to_string())),
            };

            let outcome = match choice {
                MENU_IMPORT => self.import_flow().await,
                MENU_ANALYZE => self.analyze_flow().await,
                MENU_INSIGHTS => self.insights_flow().await,
                MENU_MESSAGES => self.messages_flow().await,
                _ => return Ok(()),
            };

            if let Err(e) = outcome {
                warn!(error = %e, "menu action failed");
                println!("Error: {}", e);
            }
        }
    }
}
