//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use insight_extractor::adapters::ai::{AnthropicAdapter, MockAiAdapter, OpenAiAdapter};
use insight_extractor::adapters::persistence::SqliteRepo;
use insight_extractor::adapters::ui::tui::TuiInputPort;
use insight_extractor::ports::{AnalysisLogPort, InputPort, MessageStorePort, ModelPort};
use insight_extractor::shared::config::{AiProvider, AppConfig};
use insight_extractor::usecases::{AnalysisService, IngestService, InsightExtractor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    insight_extractor::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    // --- Storage (messages + analysis results in one SQLite file) ---
    let sqlite_repo = Arc::new(
        SqliteRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    let message_store: Arc<dyn MessageStorePort> =
        Arc::clone(&sqlite_repo) as Arc<dyn MessageStorePort>;
    let analysis_log: Arc<dyn AnalysisLogPort> =
        Arc::clone(&sqlite_repo) as Arc<dyn AnalysisLogPort>;

    // --- Model adapter ---
    let model = build_model(&cfg);
    let extractor = Arc::new(InsightExtractor::new(model));

    // --- Services ---
    let ingest_service = Arc::new(IngestService::new(Arc::clone(&message_store)));
    let analysis_service = Arc::new(AnalysisService::new(
        extractor,
        Arc::clone(&message_store),
        analysis_log,
    ));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        ingest_service,
        analysis_service,
        data_path.join("reports"),
    ));

    // --- Run (main menu -> Import / Analyze / Insights) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

/// Pick the model adapter from config. Falls back to the mock adapter when no API key is set.
fn build_model(cfg: &AppConfig) -> Arc<dyn ModelPort> {
    let timeout = Duration::from_secs(cfg.ai_timeout_secs_or_default());
    let provider = cfg.ai_provider();
    let api_key = cfg.ai_api_key();

    match (provider, api_key) {
        (AiProvider::Anthropic, Some(key)) => {
            info!(
                model = %cfg.ai_model_or_default(),
                url = %cfg.ai_api_url_or_default(),
                "AI analysis enabled with Anthropic adapter"
            );
            Arc::new(AnthropicAdapter::new(
                cfg.ai_api_url_or_default(),
                key,
                cfg.ai_model_or_default(),
                cfg.ai_max_tokens_or_default(),
                timeout,
            ))
        }
        (AiProvider::OpenAi, key) if key.is_some() || cfg.ai_api_url.is_some() => {
            // Local OpenAI-compatible servers (e.g. Ollama) need no key.
            info!(
                model = %cfg.ai_model_or_default(),
                url = %cfg.ai_api_url_or_default(),
                "AI analysis enabled with OpenAI adapter"
            );
            Arc::new(OpenAiAdapter::new(
                cfg.ai_api_url_or_default(),
                key.unwrap_or_default(),
                cfg.ai_model_or_default(),
                timeout,
            ))
        }
        (AiProvider::Mock, _) => {
            info!("using mock AI adapter");
            Arc::new(MockAiAdapter::new())
        }
        (provider, _) => {
            warn!(%provider, "no API key configured, using mock AI adapter");
            Arc::new(MockAiAdapter::new())
        }
    }
}
