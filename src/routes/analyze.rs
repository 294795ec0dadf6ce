use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{Action, AnalyzeRequest, AnalyzeResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(analyze))
}

/// Analyze a batch of tickers
///
/// Returns one record per requested ticker, in request order. Tickers without
/// price history come back with `"N/A"` in every numeric field and in `action`.
///
/// # Example
/// ```text
/// POST /api/analyze
/// {"tickers": ["005930", "000660"]}
/// ```
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        error!("Rejected analyze request body: {}", e);
        AppError::from(e)
    })?;

    info!("POST /analyze - {} tickers", request.tickers.len());

    let results = state.analyzer.analyze_batch(&request.tickers).await;

    let unavailable = results
        .iter()
        .filter(|r| r.action == Action::Unavailable)
        .count();
    info!(
        "Analyzed {} tickers ({} without price history)",
        results.len(),
        unavailable
    );

    Ok(Json(AnalyzeResponse { results }))
}
