use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Window sizes and scaling used by the indicator engine.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub fast_span: usize,
    pub slow_span: usize,
    pub signal_span: usize,
    pub band_window: usize,
    /// Band half-width in standard deviations
    pub band_width: f64,
    /// Normalized MACD spans [-scale, scale]
    pub macd_scale: f64,
    /// Band position is clamped to [-clamp, clamp]
    pub bb_clamp: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_span: 12,
            slow_span: 26,
            signal_span: 9,
            band_window: 20,
            band_width: 2.0,
            macd_scale: 100.0,
            bb_clamp: 100.0,
        }
    }
}

/// Classification thresholds, compared against values rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalThresholds {
    /// SELL requires macd and band position strictly above this
    pub overbought: f64,
    /// BUY requires band position strictly below this and macd at or below it
    pub oversold: f64,
    /// BUY requires macd at or above this
    pub macd_floor: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            overbought: 80.0,
            oversold: -80.0,
            macd_floor: -100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NaverConfig {
    pub chart_url: String,
    pub item_url: String,
    pub timeout: Duration,
}

impl Default for NaverConfig {
    fn default() -> Self {
        Self {
            chart_url: "https://fchart.stock.naver.com/sise.nhn".to_string(),
            item_url: "https://finance.naver.com/item/main.naver".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Trailing months of daily bars requested per ticker
    pub history_months: u32,
    /// Max tickers analyzed at once; results keep request order
    pub concurrency: usize,
    pub indicators: IndicatorParams,
    pub thresholds: SignalThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_months: 6,
            concurrency: 4,
            indicators: IndicatorParams::default(),
            thresholds: SignalThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Bars requested from the history source, 31 per month.
    pub fn history_bars(&self) -> u32 {
        self.history_months.saturating_mul(31)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allow_origin: String,
    pub naver: NaverConfig,
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allow_origin: "*".to_string(),
            naver: NaverConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout_secs = env_or("FETCH_TIMEOUT_SECS", defaults.naver.timeout.as_secs());

        Self {
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env_or("SERVER_PORT", defaults.port),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN")
                .unwrap_or(defaults.cors_allow_origin),
            naver: NaverConfig {
                chart_url: std::env::var("NAVER_CHART_URL").unwrap_or(defaults.naver.chart_url),
                item_url: std::env::var("NAVER_ITEM_URL").unwrap_or(defaults.naver.item_url),
                timeout: Duration::from_secs(timeout_secs),
            },
            analysis: AnalysisConfig {
                history_months: env_or("HISTORY_MONTHS", defaults.analysis.history_months),
                concurrency: env_or("ANALYSIS_CONCURRENCY", defaults.analysis.concurrency).max(1),
                ..defaults.analysis
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!("Invalid value for {}: '{}', using default {}", key, raw, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_indicator_settings() {
        let params = IndicatorParams::default();
        assert_eq!(
            (params.fast_span, params.slow_span, params.signal_span, params.band_window),
            (12, 26, 9, 20)
        );

        let thresholds = SignalThresholds::default();
        assert_eq!(thresholds.overbought, 80.0);
        assert_eq!(thresholds.oversold, -80.0);
        assert_eq!(thresholds.macd_floor, -100.0);
    }

    #[test]
    fn test_history_bars_uses_31_days_per_month() {
        let config = AnalysisConfig::default();
        assert_eq!(config.history_bars(), 186);
    }

    #[test]
    fn test_parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or("SERVER_PORT", "8080", 3000u16), 8080);
        assert_eq!(parse_or("SERVER_PORT", "not-a-port", 3000u16), 3000);
        assert_eq!(parse_or("HISTORY_MONTHS", " 12 ", 6u32), 12);
    }
}
