// =============================================================================
// Maximum Drawdown
// =============================================================================
//
// Rebuilds a growth index from the compounded daily returns:
//
//   cum_t = 1 + cumulative_return_t          (cum_0 = 1)
//   dd_t  = (cum_t - running_max_t) / running_max_t        (always <= 0)
//
// The trough is the date of the global minimum dd (the latest one on ties);
// the peak is the latest date at or before the trough where cum reached the
// running maximum. Re-deriving from returns rather than raw prices can drift
// slightly from a price-based drawdown; that drift is kept.

use chrono::NaiveDate;
use serde::Serialize;

use super::returns::ReturnSeries;

/// Deepest peak-to-trough decline of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawdownResult {
    /// Negative percentage (0 when the series never fell below a high).
    pub max_drawdown_pct: f64,
    pub peak_date: NaiveDate,
    pub trough_date: NaiveDate,
}

/// Maximum drawdown of the growth index behind `returns`.
///
/// Returns `None` when fewer than two points exist (no return, no drawdown).
pub fn calculate_max_drawdown(returns: &ReturnSeries) -> Option<DrawdownResult> {
    let dates = &returns.dates;
    if dates.len() < 2 || returns.cumulative.len() != dates.len() {
        return None;
    }

    let mut running_max = f64::MIN;
    let mut peak_idx = 0usize;

    let mut min_dd = 0.0_f64;
    let mut trough_idx = 0usize;
    let mut peak_at_trough = 0usize;

    for (t, c) in returns.cumulative.iter().enumerate() {
        let cum = 1.0 + c;

        if cum >= running_max {
            running_max = cum;
            peak_idx = t;
        }

        let dd = (cum - running_max) / running_max;
        if dd <= min_dd {
            min_dd = dd;
            trough_idx = t;
            peak_at_trough = peak_idx;
        }
    }

    if !min_dd.is_finite() {
        return None;
    }

    Some(DrawdownResult {
        max_drawdown_pct: min_dd * 100.0,
        peak_date: dates[peak_at_trough],
        trough_date: dates[trough_idx],
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::returns::prepare_returns;
    use crate::types::{PriceBar, PriceField, PriceSeries};

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Days::new(i as u64)
    }

    fn drawdown(prices: &[f64]) -> Option<DrawdownResult> {
        let series = PriceSeries::from_bars(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PriceBar::flat(day(i), p))
                .collect(),
        );
        calculate_max_drawdown(&prepare_returns(&series, PriceField::Adjusted).ok()?)
    }

    #[test]
    fn short_series_has_no_drawdown() {
        assert!(drawdown(&[]).is_none());
        assert!(drawdown(&[10.0]).is_none());
    }

    #[test]
    fn misaligned_series_is_rejected() {
        let returns = ReturnSeries {
            dates: vec![day(0), day(1)],
            returns: vec![None, Some(0.1)],
            cumulative: vec![0.0],
        };
        assert!(calculate_max_drawdown(&returns).is_none());
    }

    #[test]
    fn strictly_increasing_has_zero_drawdown_at_last_date() {
        let prices: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let dd = drawdown(&prices).unwrap();
        assert_eq!(dd.max_drawdown_pct, 0.0);
        assert_eq!(dd.peak_date, day(9));
        assert_eq!(dd.trough_date, day(9));
    }

    #[test]
    fn finds_peak_and_trough() {
        // Peak at 120 (idx 2), trough at 60 (idx 4) => -50%.
        let dd = drawdown(&[100.0, 110.0, 120.0, 90.0, 60.0, 80.0, 115.0]).unwrap();
        assert!((dd.max_drawdown_pct + 50.0).abs() < 1e-9, "got {}", dd.max_drawdown_pct);
        assert_eq!(dd.peak_date, day(2));
        assert_eq!(dd.trough_date, day(4));
    }

    #[test]
    fn decline_from_first_day_peaks_on_first_day() {
        let dd = drawdown(&[100.0, 80.0, 90.0]).unwrap();
        assert!((dd.max_drawdown_pct + 20.0).abs() < 1e-9);
        assert_eq!(dd.peak_date, day(0));
        assert_eq!(dd.trough_date, day(1));
    }

    #[test]
    fn deeper_second_drawdown_wins() {
        let dd = drawdown(&[100.0, 90.0, 130.0, 65.0, 70.0]).unwrap();
        assert!((dd.max_drawdown_pct + 50.0).abs() < 1e-9);
        assert_eq!(dd.peak_date, day(2));
        assert_eq!(dd.trough_date, day(3));
    }

    #[test]
    fn drawdown_never_positive() {
        let dd = drawdown(&[5.0, 7.0, 6.5, 9.0, 3.0, 4.0, 10.0, 9.9]).unwrap();
        assert!(dd.max_drawdown_pct <= 0.0);
        assert!(dd.peak_date <= dd.trough_date);
    }
}
