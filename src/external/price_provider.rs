use async_trait::async_trait;
use thiserror::Error;

use crate::models::PriceSeries;

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

impl From<reqwest::Error> for PriceProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PriceProviderError::Parse(e.to_string())
        } else {
            PriceProviderError::Network(e.to_string())
        }
    }
}

/// Source of daily price history and display names.
///
/// Implementations bound their own latency (HTTP timeouts) and report
/// failures as errors; "no data" is an `Ok` with an empty series.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        bars: u32,
    ) -> Result<PriceSeries, PriceProviderError>;

    async fn fetch_company_name(&self, ticker: &str) -> Result<String, PriceProviderError>;
}
