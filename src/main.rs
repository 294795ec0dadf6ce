use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use signalboard_backend::app;
use signalboard_backend::config::AppConfig;
use signalboard_backend::external::naver::NaverProvider;
use signalboard_backend::logging::{self, LoggingConfig};
use signalboard_backend::services::analysis_service::InstrumentAnalyzer;
use signalboard_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env();
    tracing::info!(
        "Using Naver Finance history ({} months, {}s timeout, concurrency {})",
        config.analysis.history_months,
        config.naver.timeout.as_secs(),
        config.analysis.concurrency
    );

    let provider = NaverProvider::new(&config.naver)
        .context("failed to create Naver Finance provider")?;

    let state = AppState {
        analyzer: Arc::new(InstrumentAnalyzer::new(
            Arc::new(provider),
            config.analysis.clone(),
        )),
    };
    let app = app::create_app(state, &config.cors_allow_origin);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Signalboard backend running at http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
