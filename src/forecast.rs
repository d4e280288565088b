// =============================================================================
// Baseline Forecasts
// =============================================================================
//
// Two stateless, deterministic heuristics over a flat price history. Neither
// estimates confidence intervals or residual error; they are baselines, not
// predictive models.
//
// Moving average:
//   next = mean(last `window` values), appended and fed back in, `horizon`
//   times. Converges toward a flat line.
//
// Linear trend:
//   least-squares fit  price ≈ m·i + c  over i = 0..N-1, evaluated at
//   i = N .. N+horizon-1. Forecasts are collinear.
//
// Both round each emitted value to 2 decimals. User-supplied horizons are
// bounded by MAX_FORECAST_DAYS before either runs.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::types::{round2, ForecastMethod};

/// Default look-back for the moving-average forecast.
pub const DEFAULT_MA_WINDOW: usize = 5;

/// Longest accepted horizon: one trading year.
pub const MAX_FORECAST_DAYS: usize = 252;

/// Accept a user-supplied horizon in `1..=MAX_FORECAST_DAYS`.
pub fn check_horizon(days: usize) -> Result<usize> {
    if (1..=MAX_FORECAST_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(AnalysisError::InvalidInput(format!(
            "forecast horizon must be between 1 and {MAX_FORECAST_DAYS} days, got {days}"
        )))
    }
}

/// Forecast values tagged with the method that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub method: ForecastMethod,
    pub values: Vec<f64>,
}

impl ForecastResult {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Iterated moving-average forecast.
///
/// Returns an empty `Vec` when `window == 0` or fewer than `window` prices
/// exist.
pub fn forecast_moving_average(prices: &[f64], window: usize, horizon: usize) -> Vec<f64> {
    if window == 0 || prices.len() < window {
        return Vec::new();
    }

    let mut extended = prices.to_vec();
    let mut forecast = Vec::new();

    for _ in 0..horizon {
        let tail = &extended[extended.len() - window..];
        let avg = tail.iter().sum::<f64>() / window as f64;
        forecast.push(round2(avg));
        // Feed back the unrounded mean.
        extended.push(avg);
    }

    forecast
}

/// Linear-trend forecast from an OLS line over all prices.
///
/// Returns an empty `Vec` with fewer than 2 prices.
pub fn forecast_linear_trend(prices: &[f64], horizon: usize) -> Vec<f64> {
    let Some((slope, intercept)) = fit_line(prices) else {
        return Vec::new();
    };

    let n = prices.len();
    (0..horizon)
        .map(|k| round2(slope * (n as f64 + k as f64) + intercept))
        .collect()
}

/// Run both baselines over the same history.
pub fn run_baselines(prices: &[f64], window: usize, horizon: usize) -> Vec<ForecastResult> {
    let results = vec![
        ForecastResult {
            method: ForecastMethod::MovingAverage,
            values: forecast_moving_average(prices, window, horizon),
        },
        ForecastResult {
            method: ForecastMethod::LinearTrend,
            values: forecast_linear_trend(prices, horizon),
        },
    ];

    debug!(
        history = prices.len(),
        window,
        horizon,
        produced = results.iter().filter(|r| !r.is_empty()).count(),
        "baseline forecasts computed"
    );

    results
}

/// The next `horizon` weekdays after `last`, used to date forecast points.
pub fn forecast_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = last;
    while dates.len() < horizon {
        let Some(next) = day.checked_add_days(Days::new(1)) else {
            break;
        };
        day = next;
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
    }
    dates
}

/// Ordinary least squares over (index, price). `None` below 2 points.
fn fit_line(prices: &[f64]) -> Option<(f64, f64)> {
    if prices.len() < 2 {
        return None;
    }

    // slope = Σ((x-x̄)(y-ȳ)) / Σ((x-x̄)²)
    let n = prices.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = prices.iter().sum::<f64>() / n;

    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;
    for (i, &y) in prices.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator.abs() < f64::EPSILON {
        return None;
    }

    let slope = numerator / denominator;
    Some((slope, y_mean - slope * x_mean))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- moving average --------------------------------------------------

    #[test]
    fn ma_single_step_is_mean_of_window() {
        assert_eq!(forecast_moving_average(&[10.0, 20.0, 30.0], 3, 1), vec![20.0]);
    }

    #[test]
    fn ma_insufficient_history_is_empty() {
        assert!(forecast_moving_average(&[1.0, 2.0], 3, 5).is_empty());
        assert!(forecast_moving_average(&[], 1, 5).is_empty());
        assert!(forecast_moving_average(&[1.0, 2.0], 0, 5).is_empty());
    }

    #[test]
    fn ma_length_equals_horizon() {
        let prices = [100.0, 102.0, 105.0, 107.0, 110.0, 115.0];
        assert_eq!(forecast_moving_average(&prices, 3, 5).len(), 5);
        assert!(forecast_moving_average(&prices, 3, 0).is_empty());
    }

    #[test]
    fn ma_feeds_back_its_own_output() {
        // 110, 115 and the first forecast 110.67 (unrounded 110.666..)
        let prices = [100.0, 102.0, 105.0, 107.0, 110.0, 115.0];
        let f = forecast_moving_average(&prices, 3, 2);
        assert_eq!(f[0], 110.67);
        let expected = (110.0 + 115.0 + 332.0 / 3.0) / 3.0;
        assert_eq!(f[1], round2(expected));
    }

    #[test]
    fn ma_flattens_out() {
        let prices = [1.0, 50.0, 3.0, 80.0, 10.0];
        let f = forecast_moving_average(&prices, 3, 60);
        let tail = &f[50..];
        let spread = tail.iter().cloned().fold(f64::MIN, f64::max)
            - tail.iter().cloned().fold(f64::MAX, f64::min);
        assert!(spread <= 0.01, "spread {spread}");
    }

    // ---- linear trend ----------------------------------------------------

    #[test]
    fn linear_continues_slope() {
        assert_eq!(forecast_linear_trend(&[1.0, 2.0, 3.0, 4.0], 2), vec![5.0, 6.0]);
    }

    #[test]
    fn linear_needs_two_points() {
        assert!(forecast_linear_trend(&[], 3).is_empty());
        assert!(forecast_linear_trend(&[5.0], 3).is_empty());
    }

    #[test]
    fn linear_flat_series_stays_flat() {
        assert_eq!(forecast_linear_trend(&[7.0; 10], 3), vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn linear_forecasts_are_collinear() {
        let prices = [3.0, 9.0, 4.0, 12.0, 8.0, 15.0];
        let f = forecast_linear_trend(&prices, 4);
        assert_eq!(f.len(), 4);
        let step = f[1] - f[0];
        for w in f.windows(2) {
            // Rounding to cents may shift one step by a cent.
            assert!((w[1] - w[0] - step).abs() <= 0.011);
        }
    }

    #[test]
    fn fit_line_recovers_exact_line() {
        let prices: Vec<f64> = (0..8).map(|i| 2.5 * i as f64 - 1.0).collect();
        let (m, c) = fit_line(&prices).unwrap();
        assert!((m - 2.5).abs() < 1e-12);
        assert!((c + 1.0).abs() < 1e-12);
    }

    // ---- baselines & dates -----------------------------------------------

    #[test]
    fn baselines_tag_methods() {
        let results = run_baselines(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].method, ForecastMethod::MovingAverage);
        assert_eq!(results[1].method, ForecastMethod::LinearTrend);
        assert_eq!(results[1].values, vec![6.0, 7.0]);
    }

    #[test]
    fn horizon_is_bounded() {
        assert_eq!(check_horizon(7), Ok(7));
        assert_eq!(check_horizon(MAX_FORECAST_DAYS), Ok(MAX_FORECAST_DAYS));
        assert!(check_horizon(0).is_err());
        assert!(check_horizon(MAX_FORECAST_DAYS + 1).is_err());
        assert!(check_horizon(usize::MAX).is_err());
    }

    #[test]
    fn longest_horizon_runs_to_completion() {
        let results = run_baselines(&[1.0, 2.0, 3.0], 3, MAX_FORECAST_DAYS);
        assert!(results.iter().all(|r| r.values.len() == MAX_FORECAST_DAYS));
        assert_eq!(results[1].values[MAX_FORECAST_DAYS - 1], 3.0 + MAX_FORECAST_DAYS as f64);
        let friday = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        assert_eq!(forecast_dates(friday, MAX_FORECAST_DAYS).len(), MAX_FORECAST_DAYS);
    }

    #[test]
    fn forecast_dates_stop_at_calendar_end() {
        let last = NaiveDate::MAX - chrono::Days::new(3);
        assert!(forecast_dates(last, 10).len() <= 3);
    }

    #[test]
    fn forecast_dates_skip_weekends() {
        // 2024-06-07 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        let dates = forecast_dates(friday, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            ]
        );
    }
}
