use crate::config::IndicatorParams;
use crate::models::{IndicatorPoint, IndicatorSeries, PriceSeries};

/// Exponential Moving Average (EMA)
///
/// Seeded with the first observation, no bias adjustment:
/// `ema[0] = x[0]`, `ema[i] = alpha * x[i] + (1 - alpha) * ema[i-1]`,
/// `alpha = 2 / (span + 1)`.
///
/// The recurrence is evaluated as `prev + alpha * (x - prev)` so a constant
/// run stays exactly constant.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let Some(&seed) = values.first() else {
        return Vec::new();
    };

    let alpha = 2.0 / (span as f64 + 1.0);

    values
        .iter()
        .scan(seed, move |prev, &v| {
            *prev += alpha * (v - *prev);
            Some(*prev)
        })
        .collect()
}

/// Trailing mean and sample standard deviation (N-1) for every index.
///
/// The window holds up to `window` values ending at `i`; early indices use
/// whatever is available (minimum one value). A single-value or flat window
/// has a standard deviation of exactly 0.
pub fn rolling_mean_std(values: &[f64], window: usize) -> Vec<(f64, f64)> {
    let window = window.max(1);

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            window_stats(&values[start..=i])
        })
        .collect()
}

fn window_stats(window: &[f64]) -> (f64, f64) {
    let first = window[0];
    if window.iter().all(|&v| v == first) {
        return (first, 0.0);
    }

    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let sum_sq = window
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>();

    (mean, (sum_sq / (n - 1.0)).sqrt())
}

/// Moving Average Convergence Divergence (MACD)
///
/// Returns `(macd_line, signal_line, gap)` aligned with `prices`, where the
/// gap is `macd_line - signal_line` (the histogram).
pub fn macd(
    prices: &[f64],
    fast_span: usize,
    slow_span: usize,
    signal_span: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast = ema(prices, fast_span);
    let slow = ema(prices, slow_span);

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, signal_span);
    let gap = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    (line, signal, gap)
}

/// Min-max rescale into `[-scale, scale]` using the extremes of the WHOLE
/// slice, not a rolling window. Appending history can therefore shift every
/// earlier value. A zero range maps everything to 0.
pub fn normalize_to_range(values: &[f64], scale: f64) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    if values.is_empty() || range == 0.0 {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|&v| (v - min) / range * (2.0 * scale) - scale)
        .collect()
}

/// Where `close` sits inside a band of `width` standard deviations around
/// `mean`, in percent of the half-band, clamped to `[-clamp, clamp]`.
///
/// Returns 0 when the band has zero width.
pub fn bollinger_position(close: f64, mean: f64, std_dev: f64, width: f64, clamp: f64) -> f64 {
    let half_band = std_dev * width;
    if half_band == 0.0 {
        return 0.0;
    }

    ((close - mean) / half_band * 100.0).clamp(-clamp, clamp)
}

/// Runs the full indicator pipeline over a validated price series.
///
/// Pure: the input is only read and the same series always yields the same
/// output. An empty series yields an empty `IndicatorSeries`.
pub fn compute_indicator_series(series: &PriceSeries, params: &IndicatorParams) -> IndicatorSeries {
    if series.is_empty() {
        return IndicatorSeries::default();
    }

    let closes = series.closes();

    let ema_fast = ema(&closes, params.fast_span);
    let ema_slow = ema(&closes, params.slow_span);
    let (macd_line, macd_signal, macd_gap) =
        macd(&closes, params.fast_span, params.slow_span, params.signal_span);
    let macd_normalized = normalize_to_range(&macd_gap, params.macd_scale);
    let band_stats = rolling_mean_std(&closes, params.band_window);

    let points = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let (moving_average_20, std_dev_20) = band_stats[i];
            IndicatorPoint {
                date: bar.date,
                close: bar.close,
                ema_fast: ema_fast[i],
                ema_slow: ema_slow[i],
                macd_line: macd_line[i],
                macd_signal: macd_signal[i],
                macd_gap: macd_gap[i],
                macd_normalized: macd_normalized[i],
                moving_average_20,
                std_dev_20,
                bb_position: bollinger_position(
                    bar.close,
                    moving_average_20,
                    std_dev_20,
                    params.band_width,
                    params.bb_clamp,
                ),
            }
        })
        .collect();

    IndicatorSeries::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::{Duration, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c, c, c, c, 0.0))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_ema_seeds_with_first_value() {
        // span 3 -> alpha 0.5
        let values = ema(&[1.0, 2.0, 3.0], 3);
        assert_eq!(values, vec![1.0, 1.5, 2.25]);
    }

    #[test]
    fn test_ema_empty_input() {
        assert!(ema(&[], 12).is_empty());
    }

    #[test]
    fn test_rolling_stats_min_periods_one() {
        let stats = rolling_mean_std(&[1.0, 2.0, 3.0], 2);

        assert_eq!(stats[0], (1.0, 0.0));
        assert_close(stats[1].0, 1.5);
        assert_close(stats[1].1, 0.5_f64.sqrt());
        assert_close(stats[2].0, 2.5);
        assert_close(stats[2].1, 0.5_f64.sqrt());
    }

    #[test]
    fn test_rolling_stats_uses_sample_std_over_trailing_window() {
        let closes: Vec<f64> = (1..=25).map(|i| i as f64).collect();
        let stats = rolling_mean_std(&closes, 20);

        // 1..=20: mean 10.5, sample variance 35
        assert_close(stats[19].0, 10.5);
        assert_close(stats[19].1, 35.0_f64.sqrt());
        // 6..=25
        assert_close(stats[24].0, 15.5);
        assert_close(stats[24].1, 35.0_f64.sqrt());
    }

    #[test]
    fn test_normalize_hits_both_extremes() {
        let normalized = normalize_to_range(&[-2.0, 0.0, 2.0, 1.0], 100.0);
        assert_eq!(normalized, vec![-100.0, 0.0, 100.0, 50.0]);
    }

    #[test]
    fn test_normalize_zero_range_is_all_zero() {
        assert_eq!(normalize_to_range(&[3.0, 3.0, 3.0], 100.0), vec![0.0; 3]);
        assert!(normalize_to_range(&[], 100.0).is_empty());
    }

    #[test]
    fn test_bollinger_position_zero_band_falls_back_to_zero() {
        assert_eq!(bollinger_position(105.0, 100.0, 0.0, 2.0, 100.0), 0.0);
    }

    #[test]
    fn test_bollinger_position_scales_and_clamps() {
        assert_close(bollinger_position(110.0, 100.0, 10.0, 2.0, 100.0), 50.0);
        assert_eq!(bollinger_position(200.0, 100.0, 10.0, 2.0, 100.0), 100.0);
        assert_eq!(bollinger_position(0.0, 100.0, 10.0, 2.0, 100.0), -100.0);
    }

    #[test]
    fn test_constant_series_yields_flat_indicators() {
        let series = series_from_closes(&[5000.0; 40]);
        let indicators = compute_indicator_series(&series, &IndicatorParams::default());

        assert_eq!(indicators.points().len(), 40);
        for point in indicators.points() {
            assert_eq!(point.ema_fast, 5000.0);
            assert_eq!(point.ema_slow, 5000.0);
            assert_eq!(point.macd_gap, 0.0);
            assert_eq!(point.macd_normalized, 0.0);
            assert_eq!(point.std_dev_20, 0.0);
            assert_eq!(point.bb_position, 0.0);
        }
    }

    #[test]
    fn test_output_aligned_with_input_dates() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let series = series_from_closes(&closes);
        let indicators = compute_indicator_series(&series, &IndicatorParams::default());

        assert_eq!(indicators.points().len(), series.points().len());
        for (bar, point) in series.points().iter().zip(indicators.points()) {
            assert_eq!(bar.date, point.date);
            assert_eq!(bar.close, point.close);
        }
    }

    #[test]
    fn test_indicator_ranges_hold_for_noisy_series() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 1000.0 + (i as f64 * 0.37).sin() * 80.0 + (i as f64 * 1.3).cos() * 25.0)
            .collect();
        let series = series_from_closes(&closes);
        let indicators = compute_indicator_series(&series, &IndicatorParams::default());

        let normalized: Vec<f64> = indicators.points().iter().map(|p| p.macd_normalized).collect();
        assert!(normalized.iter().all(|v| (-100.0..=100.0).contains(v)));
        assert!(normalized.contains(&100.0));
        assert!(normalized.contains(&-100.0));

        for point in indicators.points() {
            assert!((-100.0..=100.0).contains(&point.bb_position));
            assert_close(point.macd_gap, point.ema_fast - point.ema_slow - point.macd_signal);
        }
    }

    #[test]
    fn test_first_period_has_zero_band_position() {
        let series = series_from_closes(&[100.0, 120.0, 90.0]);
        let indicators = compute_indicator_series(&series, &IndicatorParams::default());

        let first = indicators.points()[0];
        assert_eq!(first.moving_average_20, 100.0);
        assert_eq!(first.std_dev_20, 0.0);
        assert_eq!(first.bb_position, 0.0);
    }

    #[test]
    fn test_linear_ramp_band_position() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let series = series_from_closes(&closes);
        let indicators = compute_indicator_series(&series, &IndicatorParams::default());

        // (20 - 10.5) / (2 * sqrt(35)) * 100
        let expected = 9.5 / (2.0 * 35.0_f64.sqrt()) * 100.0;
        assert_close(indicators.latest().unwrap().bb_position, expected);
    }

    #[test]
    fn test_empty_series_yields_empty_indicators() {
        let indicators = compute_indicator_series(&PriceSeries::empty(), &IndicatorParams::default());
        assert!(indicators.points().is_empty());
        assert!(indicators.latest().is_none());
    }

    #[test]
    fn test_recomputation_is_bit_identical() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.9).cos() * 3.3).collect();
        let series = series_from_closes(&closes);
        let params = IndicatorParams::default();

        let first = compute_indicator_series(&series, &params);
        let second = compute_indicator_series(&series, &params);

        for (a, b) in first.points().iter().zip(second.points()) {
            assert_eq!(a.macd_normalized.to_bits(), b.macd_normalized.to_bits());
            assert_eq!(a.bb_position.to_bits(), b.bb_position.to_bits());
        }
    }
}
