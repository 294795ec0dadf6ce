mod price_point;
mod indicator;
mod recommendation;

pub use price_point::{InvalidSeriesError, PricePoint, PriceSeries};
pub use indicator::{IndicatorPoint, IndicatorSeries};
pub use recommendation::{
    Action, AnalyzeRequest, AnalyzeResponse, Metric, Recommendation, UNAVAILABLE_MARKER,
};
