use crate::config::SignalThresholds;
use crate::models::{Action, IndicatorSeries};

/// Latest indicator values, rounded the way they are reported and compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalReading {
    pub close: f64,
    pub macd: f64,
    pub bb_position: f64,
    pub action: Action,
}

/// Round to 2 decimal places, ties to even.
///
/// Ties are judged on the exact value the float holds, so `2.675` (stored as
/// 2.67499...) goes down while an exactly representable `80.125` goes to
/// `80.12`.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    // value * 100 == scaled + residual exactly
    let residual = value.mul_add(100.0, -scaled);
    let floor = scaled.floor();

    let hundredths = if scaled - floor == 0.5 {
        if residual > 0.0 {
            floor + 1.0
        } else if residual < 0.0 {
            floor
        } else if floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };

    hundredths / 100.0
}

/// Maps the latest MACD / Bollinger reading to a trading action.
pub struct SignalClassifier {
    thresholds: SignalThresholds,
}

impl SignalClassifier {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify already-rounded values. First match wins:
    /// SELL when both are above the overbought line, BUY when macd sits in
    /// `[macd_floor, oversold]` and the band position is below oversold.
    pub fn classify(&self, macd: f64, bb_position: f64) -> Action {
        let t = &self.thresholds;

        if macd > t.overbought && bb_position > t.overbought {
            Action::Sell
        } else if (t.macd_floor..=t.oversold).contains(&macd) && bb_position < t.oversold {
            Action::Buy
        } else {
            Action::Hold
        }
    }

    /// Round the raw values to 2 decimals, then classify.
    pub fn classify_raw(&self, macd: f64, bb_position: f64) -> (f64, f64, Action) {
        let macd = round2(macd);
        let bb_position = round2(bb_position);
        (macd, bb_position, self.classify(macd, bb_position))
    }

    /// Reading for the most recent period, `None` for an empty series.
    pub fn evaluate(&self, indicators: &IndicatorSeries) -> Option<SignalReading> {
        let latest = indicators.latest()?;
        let (macd, bb_position, action) =
            self.classify_raw(latest.macd_normalized, latest.bb_position);

        Some(SignalReading {
            close: latest.close,
            macd,
            bb_position,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SignalClassifier {
        SignalClassifier::new(SignalThresholds::default())
    }

    #[test]
    fn test_sell_when_both_overbought() {
        assert_eq!(classifier().classify(85.0, 90.0), Action::Sell);
    }

    #[test]
    fn test_buy_when_both_oversold() {
        assert_eq!(classifier().classify(-90.0, -85.0), Action::Buy);
    }

    #[test]
    fn test_hold_in_neutral_zone() {
        assert_eq!(classifier().classify(50.0, 50.0), Action::Hold);
    }

    #[test]
    fn test_buy_requires_strictly_oversold_band() {
        let classifier = classifier();
        assert_eq!(classifier.classify(-80.0, -80.0), Action::Hold);
        assert_eq!(classifier.classify(-80.0, -80.01), Action::Buy);
        assert_eq!(classifier.classify(-100.0, -100.0), Action::Buy);
    }

    #[test]
    fn test_sell_requires_strictly_overbought() {
        let classifier = classifier();
        assert_eq!(classifier.classify(80.0, 95.0), Action::Hold);
        assert_eq!(classifier.classify(95.0, 80.0), Action::Hold);
        assert_eq!(classifier.classify(100.0, 100.0), Action::Sell);
    }

    #[test]
    fn test_high_macd_with_low_band_is_hold() {
        assert_eq!(classifier().classify(95.0, -95.0), Action::Hold);
        assert_eq!(classifier().classify(-95.0, 95.0), Action::Hold);
    }

    #[test]
    fn test_rounding_happens_before_thresholds() {
        let classifier = classifier();

        let (macd, _, action) = classifier.classify_raw(80.004, 90.0);
        assert_eq!(macd, 80.0);
        assert_eq!(action, Action::Hold);

        let (macd, _, action) = classifier.classify_raw(80.006, 90.0);
        assert_eq!(macd, 80.01);
        assert_eq!(action, Action::Sell);
    }

    #[test]
    fn test_rounding_decides_buy_boundaries() {
        let classifier = classifier();

        let (_, bb_position, action) = classifier.classify_raw(-90.0, -80.004);
        assert_eq!(bb_position, -80.0);
        assert_eq!(action, Action::Hold);

        let (_, bb_position, action) = classifier.classify_raw(-90.0, -80.006);
        assert_eq!(bb_position, -80.01);
        assert_eq!(action, Action::Buy);

        // just past the floor rounds back onto it
        let (macd, _, action) = classifier.classify_raw(-100.004, -90.0);
        assert_eq!(macd, -100.0);
        assert_eq!(action, Action::Buy);

        let (macd, _, action) = classifier.classify_raw(-100.006, -90.0);
        assert_eq!(macd, -100.01);
        assert_eq!(action, Action::Hold);

        let (macd, _, action) = classifier.classify_raw(-79.996, -90.0);
        assert_eq!(macd, -80.0);
        assert_eq!(action, Action::Buy);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345678), 12.35);
        assert_eq!(round2(-12.344), -12.34);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_round2_ties_go_to_even() {
        assert_eq!(round2(80.125), 80.12);
        assert_eq!(round2(80.375), 80.38);
        assert_eq!(round2(-80.125), -80.12);
        assert_eq!(round2(0.125), 0.12);
        // stored just below the tie
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
    }

    #[test]
    fn test_evaluate_empty_series() {
        assert!(classifier()
            .evaluate(&IndicatorSeries::default())
            .is_none());
    }
}
