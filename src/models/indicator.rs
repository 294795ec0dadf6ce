use chrono::NaiveDate;

/// Indicator values derived for a single trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub close: f64,

    /// 12-period EMA of close
    pub ema_fast: f64,

    /// 26-period EMA of close
    pub ema_slow: f64,

    /// Fast EMA minus slow EMA
    pub macd_line: f64,

    /// 9-period EMA of the MACD line
    pub macd_signal: f64,

    /// MACD line minus signal line; the value that gets normalized
    pub macd_gap: f64,

    /// `macd_gap` rescaled over the whole series into [-100, 100]
    pub macd_normalized: f64,

    pub moving_average_20: f64,

    /// Sample standard deviation (N-1) over the same trailing window
    pub std_dev_20: f64,

    /// Position of close inside the Bollinger band, clamped to [-100, 100]
    pub bb_position: f64,
}

/// One `IndicatorPoint` per `PricePoint`, dates aligned with the source series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSeries {
    points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn from_points(points: Vec<IndicatorPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&IndicatorPoint> {
        self.points.last()
    }
}
