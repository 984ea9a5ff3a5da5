use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::{
    ForecastOutput, ForecastParams, ForecastSeriesPoint, ForecastStatistics, PriceSample,
    SymbolForecastResponse,
};
use crate::services::price_service;
use crate::state::AppState;

/// Smoothing factor for the exponential smoothing series.
pub const SMOOTHING_ALPHA: f64 = 0.3;

/// Fallback spacing for projected points when the sample timestamps give none.
pub const ONE_DAY_MS: i64 = 86_400_000;

pub const MIN_HISTORY_DAYS: u32 = 2;
pub const MAX_HISTORY_DAYS: u32 = 365;

/// Least-squares line `price ≈ slope·i + intercept` over sample ordinals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
}

impl RegressionFit {
    pub fn value_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}

/// Fetches history for `symbol` and builds its forecast series.
///
/// Fewer than two samples is reported as `InsufficientData`, not as an error.
pub async fn generate_symbol_forecast(
    state: &AppState,
    symbol: &str,
    days: u32,
    params: ForecastParams,
) -> Result<SymbolForecastResponse, AppError> {
    if !(MIN_HISTORY_DAYS..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "history days must be between {} and {}, got {}",
            MIN_HISTORY_DAYS, MAX_HISTORY_DAYS, days
        )));
    }

    let pair = state.symbols.resolve(symbol)?;

    info!(
        "Generating forecast for {} ({} days history, MA period {}, horizon {})",
        pair.display,
        days,
        params.moving_average_period(),
        params.forecast_horizon()
    );

    let samples = price_service::fetch_history(state, &pair.coin_id, days).await?;
    let output = build_forecast(&samples, params);

    let Some(statistics) = output.statistics else {
        info!(
            "Not enough samples to forecast {} ({} received)",
            pair.display,
            samples.len()
        );
        return Ok(SymbolForecastResponse::InsufficientData {
            symbol: pair.display,
            sample_count: samples.len(),
        });
    };

    Ok(SymbolForecastResponse::Ready {
        preferred_method: state.preferences.get(&pair.display),
        symbol: pair.display,
        moving_average_period: params.moving_average_period(),
        forecast_horizon: params.forecast_horizon(),
        series: output.series,
        statistics,
    })
}

/// Builds the historical + projected chart series and its summary statistics.
///
/// Pure: identical inputs always yield identical output.
pub fn build_forecast(samples: &[PriceSample], params: ForecastParams) -> ForecastOutput {
    let n = samples.len();
    if n < 2 {
        return ForecastOutput::insufficient();
    }

    let period = params.moving_average_period();
    let horizon = params.forecast_horizon();
    let prices: Vec<f64> = samples.iter().map(|s| s.price).collect();

    let fit = fit_linear_regression(&prices);
    let moving_averages = moving_average_series(&prices, period);
    let smoothed = exponential_smoothing_series(&prices, SMOOTHING_ALPHA);

    let mut series = Vec::with_capacity(n + horizon);
    for (i, sample) in samples.iter().enumerate() {
        series.push(ForecastSeriesPoint {
            timestamp: sample.timestamp,
            actual: Some(sample.price),
            regression: fit.value_at(i),
            moving_average: moving_averages[i],
            exponential_smoothing: smoothed[i],
        });
    }

    // Projections hold the last moving average / smoothed value flat
    let last_moving_average = moving_averages[n - 1];
    let last_smoothed = smoothed[n - 1];
    let last_timestamp = samples[n - 1].timestamp;
    let interval = average_interval_ms(samples);

    for k in 1..=horizon {
        series.push(ForecastSeriesPoint {
            timestamp: projected_timestamp(last_timestamp, interval, k),
            actual: None,
            regression: fit.value_at(n - 1 + k),
            moving_average: last_moving_average,
            exponential_smoothing: last_smoothed,
        });
    }

    let last_actual_price = prices[n - 1];
    let predicted_future_price = fit.value_at(n + horizon - 1);
    let predicted_change_percent = if last_actual_price != 0.0 {
        Some((predicted_future_price - last_actual_price) / last_actual_price * 100.0)
    } else {
        None
    };

    let statistics = ForecastStatistics {
        slope: fit.slope,
        intercept: fit.intercept,
        last_actual_price,
        predicted_future_price,
        predicted_change_percent,
        r_squared: r_squared(&prices, &fit),
        sample_count: n,
    };

    debug!(
        "Forecast built: slope={:.6}, intercept={:.6}, r2={:?}, points={}",
        statistics.slope,
        statistics.intercept,
        statistics.r_squared,
        series.len()
    );

    ForecastOutput {
        series,
        statistics: Some(statistics),
    }
}

/// Closed-form OLS over ordinal indices. Callers guarantee at least two prices.
pub fn fit_linear_regression(prices: &[f64]) -> RegressionFit {
    let n = prices.len() as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, &y) in prices.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    // Distinct integer indices make the denominator non-zero for n >= 2
    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    RegressionFit { slope, intercept }
}

/// Trailing simple moving average; `None` until `period` prices are available.
pub fn moving_average_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    prices
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &prices[i + 1 - period..=i];
            Some(window.iter().sum::<f64>() / period as f64)
        })
        .collect()
}

/// `S[0] = p[0]`, `S[i] = α·p[i] + (1−α)·S[i−1]`.
pub fn exponential_smoothing_series(prices: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(prices.len());
    let Some(&first) = prices.first() else {
        return smoothed;
    };

    let mut level = first;
    smoothed.push(level);
    for &price in &prices[1..] {
        level = alpha * price + (1.0 - alpha) * level;
        smoothed.push(level);
    }
    smoothed
}

/// Mean spacing between first and last sample, or one day when that is not positive.
pub fn average_interval_ms(samples: &[PriceSample]) -> f64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) if samples.len() > 1 => {
            // i128 so spans across the whole i64 range cannot overflow
            let span = last.timestamp as i128 - first.timestamp as i128;
            let interval = span as f64 / (samples.len() - 1) as f64;
            if interval > 0.0 {
                interval
            } else {
                ONE_DAY_MS as f64
            }
        }
        _ => ONE_DAY_MS as f64,
    }
}

/// `last + interval·step`, saturating at the ends of the i64 range.
fn projected_timestamp(last_timestamp: i64, interval: f64, step: usize) -> i64 {
    // `as` saturates for out-of-range floats
    let offset = (interval * step as f64).round() as i64;
    last_timestamp.saturating_add(offset)
}

/// Coefficient of determination of `fit` over the historical prices.
///
/// `None` when the prices have no variance, where R² is undefined.
pub fn r_squared(prices: &[f64], fit: &RegressionFit) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }

    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    let mut ss_total = 0.0;
    let mut ss_residual = 0.0;
    let mut sum_squares = 0.0;
    for (i, &y) in prices.iter().enumerate() {
        ss_total += (y - mean).powi(2);
        ss_residual += (y - fit.value_at(i)).powi(2);
        sum_squares += y * y;
    }

    // Identical prices can leave rounding noise in ss_total
    if ss_total <= f64::EPSILON * sum_squares.max(f64::MIN_POSITIVE) {
        return None;
    }

    Some(1.0 - ss_residual / ss_total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = ONE_DAY_MS;

    fn daily(prices: &[f64]) -> Vec<PriceSample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PriceSample::new(1_700_000_000_000 + i as i64 * DAY, p))
            .collect()
    }

    fn params(period: usize, horizon: usize) -> ForecastParams {
        ForecastParams::new(period, horizon).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_linear_trend() {
        let samples = daily(&[100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0]);

        let output = build_forecast(&samples, params(3, 2));
        let stats = output.statistics.unwrap();

        assert!(approx(stats.slope, 2.0));
        assert!(approx(stats.intercept, 100.0));
        assert!(approx(stats.r_squared.unwrap(), 1.0));
        assert!(approx(stats.predicted_future_price, 116.0));
        assert!(approx(stats.predicted_change_percent.unwrap(), 4.0 / 112.0 * 100.0));
        assert_eq!(stats.last_actual_price, 112.0);
        assert_eq!(stats.sample_count, 7);
        assert_eq!(output.series.len(), 9);
    }

    #[test]
    fn test_two_equal_samples_are_flat() {
        let samples = daily(&[50.0, 50.0]);

        let output = build_forecast(&samples, params(1, 1));
        let stats = output.statistics.unwrap();

        assert_eq!(stats.slope, 0.0);
        assert_eq!(stats.intercept, 50.0);
        assert_eq!(stats.predicted_future_price, 50.0);
        assert_eq!(stats.predicted_change_percent, Some(0.0));
        assert_eq!(stats.r_squared, None);
        assert_eq!(output.series.len(), 3);
    }

    #[test]
    fn test_single_sample_yields_empty_output() {
        let output = build_forecast(&daily(&[42.0]), params(3, 5));

        assert!(output.series.is_empty());
        assert!(output.statistics.is_none());
        assert!(output.is_insufficient());
    }

    #[test]
    fn test_no_samples_yields_empty_output() {
        let output = build_forecast(&[], params(3, 5));
        assert_eq!(output, ForecastOutput::insufficient());
    }

    #[test]
    fn test_period_longer_than_history_has_no_moving_average() {
        let samples = daily(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);

        let output = build_forecast(&samples, params(20, 3));

        assert_eq!(output.series.len(), 13);
        assert!(output.series.iter().all(|p| p.moving_average.is_none()));
    }

    #[test]
    fn test_moving_average_defined_from_period_minus_one() {
        let prices = [3.0, 6.0, 9.0, 12.0];

        let ma = moving_average_series(&prices, 3);

        assert_eq!(ma[0], None);
        assert_eq!(ma[1], None);
        assert_eq!(ma[2], Some(6.0));
        assert_eq!(ma[3], Some(9.0));
    }

    #[test]
    fn test_smoothing_seeded_with_first_price() {
        for alpha in [0.1, 0.3, 0.9] {
            let smoothed = exponential_smoothing_series(&[17.5, 20.0, 10.0], alpha);
            assert_eq!(smoothed[0], 17.5);
        }

        let smoothed = exponential_smoothing_series(&[10.0, 20.0], SMOOTHING_ALPHA);
        assert!(approx(smoothed[1], 0.3 * 20.0 + 0.7 * 10.0));
    }

    #[test]
    fn test_projected_points_hold_last_values_flat() {
        let samples = daily(&[10.0, 11.0, 13.0, 12.0, 15.0]);

        let output = build_forecast(&samples, params(2, 3));
        let last_hist = &output.series[4];
        let projected = &output.series[5..];

        assert_eq!(projected.len(), 3);
        for point in projected {
            assert!(point.actual.is_none());
            assert_eq!(point.moving_average, last_hist.moving_average);
            assert_eq!(point.exponential_smoothing, last_hist.exponential_smoothing);
        }
        assert!(output.series[..5].iter().all(|p| p.actual.is_some()));
    }

    #[test]
    fn test_projected_timestamps_follow_average_interval() {
        let samples = vec![
            PriceSample::new(0, 1.0),
            PriceSample::new(1_000, 2.0),
            PriceSample::new(3_000, 3.0),
        ];

        let output = build_forecast(&samples, params(1, 2));

        // (3000 - 0) / 2 = 1500ms spacing
        assert_eq!(output.series[3].timestamp, 4_500);
        assert_eq!(output.series[4].timestamp, 6_000);
    }

    #[test]
    fn test_identical_timestamps_fall_back_to_one_day() {
        let samples = vec![PriceSample::new(5_000, 1.0), PriceSample::new(5_000, 2.0)];
        assert_eq!(average_interval_ms(&samples), ONE_DAY_MS as f64);
    }

    #[test]
    fn test_regression_continues_line_into_future() {
        let samples = daily(&[1.0, 3.0, 2.0, 5.0, 4.0]);

        let output = build_forecast(&samples, params(2, 4));
        let stats = output.statistics.clone().unwrap();

        for (i, point) in output.series.iter().enumerate() {
            assert!(approx(point.regression, stats.slope * i as f64 + stats.intercept));
        }
        assert!(approx(output.series.last().unwrap().regression, stats.predicted_future_price));
    }

    #[test]
    fn test_increasing_prices_project_upward() {
        let samples = daily(&[10.0, 10.5, 11.8, 12.0, 14.1, 14.2, 15.9]);

        let stats = build_forecast(&samples, params(3, 5)).statistics.unwrap();

        assert!(stats.slope > 0.0);
        assert!(stats.predicted_change_percent.unwrap() > 0.0);
        let r2 = stats.r_squared.unwrap();
        assert!(r2 > 0.9 && r2 <= 1.0);
    }

    #[test]
    fn test_zero_last_price_has_no_change_percent() {
        let stats = build_forecast(&daily(&[1.0, 0.0]), params(1, 1)).statistics.unwrap();
        assert_eq!(stats.predicted_change_percent, None);
    }

    #[test]
    fn test_build_is_deterministic() {
        let samples = daily(&[101.3, 99.8, 102.4, 104.9, 103.1, 105.5]);

        let first = build_forecast(&samples, params(3, 4));
        let second = build_forecast(&samples, params(3, 4));

        assert_eq!(first, second);
    }

    #[test]
    fn test_timestamps_near_i64_max_saturate() {
        let samples = vec![
            PriceSample::new(i64::MAX - 2 * DAY, 1.0),
            PriceSample::new(i64::MAX - DAY, 2.0),
        ];

        let output = build_forecast(&samples, params(1, 5));

        assert_eq!(output.series.len(), 7);
        assert_eq!(output.series[2].timestamp, i64::MAX);
        assert_eq!(output.series[6].timestamp, i64::MAX);
    }

    #[test]
    fn test_span_wider_than_i64_does_not_overflow() {
        let samples = vec![
            PriceSample::new(i64::MIN / 2 - 10, 1.0),
            PriceSample::new(i64::MAX / 2 + 10, 2.0),
        ];

        let interval = average_interval_ms(&samples);
        assert!(interval > 0.0);

        let output = build_forecast(&samples, params(1, 2));
        assert_eq!(output.series.len(), 4);
        assert!(output.series[3].timestamp >= output.series[2].timestamp);
    }

    #[test]
    fn test_r_squared_undefined_for_flat_fractional_prices() {
        let prices = [0.1, 0.1, 0.1, 0.1];
        let fit = fit_linear_regression(&prices);
        assert_eq!(r_squared(&prices, &fit), None);
    }
}
