use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::external::price_provider::{HistoryProvider, PriceProviderError};
use crate::models::{Metric, PriceSeries, Recommendation};
use crate::services::indicators::compute_indicator_series;
use crate::services::signal_service::SignalClassifier;

/// What the history source returned for one ticker.
#[derive(Debug)]
pub enum HistoryOutcome {
    Available(PriceSeries),
    /// The source answered but had no bars
    Empty,
    /// The fetch or parse failed
    Failed(PriceProviderError),
}

impl From<Result<PriceSeries, PriceProviderError>> for HistoryOutcome {
    fn from(result: Result<PriceSeries, PriceProviderError>) -> Self {
        match result {
            Ok(series) if series.is_empty() => HistoryOutcome::Empty,
            Ok(series) => HistoryOutcome::Available(series),
            Err(e) => HistoryOutcome::Failed(e),
        }
    }
}

/// Fetches history per ticker, runs the indicator engine and the classifier,
/// and assembles one `Recommendation` per requested ticker.
pub struct InstrumentAnalyzer {
    provider: Arc<dyn HistoryProvider>,
    classifier: SignalClassifier,
    config: AnalysisConfig,
}

impl InstrumentAnalyzer {
    pub fn new(provider: Arc<dyn HistoryProvider>, config: AnalysisConfig) -> Self {
        Self {
            provider,
            classifier: SignalClassifier::new(config.thresholds.clone()),
            config,
        }
    }

    /// Analyze every ticker. Output order matches `tickers`; a failure for one
    /// ticker only turns that ticker's record into an unavailable one.
    pub async fn analyze_batch(&self, tickers: &[String]) -> Vec<Recommendation> {
        stream::iter(tickers.iter().cloned())
            .map(|ticker| async move { self.analyze_ticker(&ticker).await })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    pub async fn analyze_ticker(&self, ticker: &str) -> Recommendation {
        let (history, name) = futures::join!(
            self.provider.fetch_daily_history(ticker, self.config.history_bars()),
            self.provider.fetch_company_name(ticker)
        );

        let company_name = name.unwrap_or_else(|e| {
            warn!("Company name lookup failed for {}: {}", ticker, e);
            String::new()
        });

        match HistoryOutcome::from(history) {
            HistoryOutcome::Available(series) => self.recommend(ticker, company_name, &series),
            HistoryOutcome::Empty => {
                info!("No price history for {}", ticker);
                Recommendation::unavailable(ticker, company_name)
            }
            HistoryOutcome::Failed(e) => {
                warn!("Price history fetch failed for {}: {}", ticker, e);
                Recommendation::unavailable(ticker, company_name)
            }
        }
    }

    /// Run the engine and the classifier over an already fetched series.
    pub fn recommend(&self, ticker: &str, company_name: String, series: &PriceSeries) -> Recommendation {
        let indicators = compute_indicator_series(series, &self.config.indicators);

        match self.classifier.evaluate(&indicators) {
            Some(reading) => {
                info!(
                    "{}: close={} macd={} bb_position={} -> {}",
                    ticker, reading.close, reading.macd, reading.bb_position, reading.action
                );
                Recommendation {
                    ticker: ticker.to_string(),
                    company_name,
                    current_price: Metric::Value(reading.close),
                    macd: Metric::Value(reading.macd),
                    bb_position: Metric::Value(reading.bb_position),
                    action: reading.action,
                }
            }
            None => Recommendation::unavailable(ticker, company_name),
        }
    }
}
