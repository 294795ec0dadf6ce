use serde::{Deserialize, Serialize, Serializer};

/// Marker written in place of any value that could not be computed.
pub const UNAVAILABLE_MARKER: &str = "N/A";

/// Trading recommendation for one instrument
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Action {
    #[serde(rename = "BUY")]
    Buy,

    #[serde(rename = "SELL")]
    Sell,

    #[serde(rename = "HOLD")]
    Hold,

    /// No price history was available for the instrument
    #[serde(rename = "N/A")]
    Unavailable,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
            Action::Unavailable => write!(f, "{}", UNAVAILABLE_MARKER),
        }
    }
}

/// A number, or the unavailable marker when the series was empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    Unavailable,
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => serializer.serialize_f64(*v),
            Metric::Unavailable => serializer.serialize_str(UNAVAILABLE_MARKER),
        }
    }
}

/// Result record for a single requested ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub ticker: String,

    /// Display name; empty when the lookup failed
    pub company_name: String,

    /// Latest close
    pub current_price: Metric,

    /// Latest normalized MACD, rounded to 2 decimals
    pub macd: Metric,

    /// Latest Bollinger band position, rounded to 2 decimals
    pub bb_position: Metric,

    pub action: Action,
}

impl Recommendation {
    pub fn unavailable(ticker: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            company_name: company_name.into(),
            current_price: Metric::Unavailable,
            macd: Metric::Unavailable,
            bb_position: Metric::Unavailable,
            action: Action::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub results: Vec<Recommendation>,
}
