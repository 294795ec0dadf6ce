use chrono::NaiveDate;
use thiserror::Error;

// One trading day of a daily price history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { date, open, high, low, close, volume }
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidSeriesError {
    #[error("dates must be strictly ascending: {previous} is followed by {current}")]
    NotAscending { previous: NaiveDate, current: NaiveDate },

    #[error("duplicate date {0}")]
    DuplicateDate(NaiveDate),

    #[error("{field} on {date} is not a finite non-negative number: {value}")]
    InvalidValue {
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },
}

/// Daily price history ordered ascending by date with no duplicate dates.
///
/// Construction validates the ordering so the indicator engine never sees a
/// series it would silently misread. The points are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, InvalidSeriesError> {
        for point in &points {
            for (field, value) in point.fields() {
                if !value.is_finite() || value < 0.0 {
                    return Err(InvalidSeriesError::InvalidValue {
                        date: point.date,
                        field,
                        value,
                    });
                }
            }
        }

        for pair in points.windows(2) {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(InvalidSeriesError::DuplicateDate(current));
            }
            if current < previous {
                return Err(InvalidSeriesError::NotAscending { previous, current });
            }
        }

        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
