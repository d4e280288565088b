// =============================================================================
// Daily & Cumulative Returns
// =============================================================================
//
//   return[t]     = (price[t] - price[t-1]) / price[t-1]      (t >= 1)
//   cumulative[t] = Π (1 + return[i]) for i in 1..=t  - 1
//
// return[0] has no prior day and is `None`; cumulative[0] is 0.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::types::{PriceField, PriceSeries};

/// Per-day returns derived from a [`PriceSeries`], aligned 1:1 with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub dates: Vec<NaiveDate>,
    pub returns: Vec<Option<f64>>,
    pub cumulative: Vec<f64>,
}

/// Percentage change between consecutive values. Index 0 is `None`.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }

    out.push(None);
    out.extend(values.windows(2).map(|w| Some((w[1] - w[0]) / w[0])));
    out
}

/// Derive daily and cumulative returns for `series` on the chosen column.
///
/// Fails with [`AnalysisError::InvalidInput`] when the series is empty.
pub fn prepare_returns(series: &PriceSeries, field: PriceField) -> Result<ReturnSeries> {
    if series.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "cannot derive returns from an empty price series".into(),
        ));
    }

    let returns = pct_change(&series.values(field));

    let mut growth = 1.0_f64;
    let cumulative = returns
        .iter()
        .map(|r| {
            if let Some(r) = r {
                growth *= 1.0 + r;
            }
            growth - 1.0
        })
        .collect();

    Ok(ReturnSeries {
        dates: series.dates(),
        returns,
        cumulative,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceBar;

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_bars(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PriceBar::flat(start + chrono::Days::new(i as u64), p))
                .collect(),
        )
    }

    #[test]
    fn empty_series_is_invalid_input() {
        let err = prepare_returns(&PriceSeries::default(), PriceField::Adjusted).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn first_return_is_undefined() {
        let r = prepare_returns(&series(&[100.0, 110.0, 99.0]), PriceField::Adjusted).unwrap();
        assert_eq!(r.dates.len(), 3);
        assert_eq!(r.returns[0], None);
        assert!((r.returns[1].unwrap() - 0.10).abs() < 1e-12);
        assert!((r.returns[2].unwrap() + 0.10).abs() < 1e-12);
        assert_eq!(r.cumulative[0], 0.0);
    }

    #[test]
    fn cumulative_matches_product_of_returns() {
        let prices = [50.0, 52.5, 51.0, 55.3, 54.1, 60.0];
        let r = prepare_returns(&series(&prices), PriceField::Adjusted).unwrap();

        for t in 0..prices.len() {
            let rebuilt: f64 = r.returns[1..=t]
                .iter()
                .map(|x| 1.0 + x.unwrap())
                .product::<f64>()
                - 1.0;
            assert!((r.cumulative[t] - rebuilt).abs() < 1e-12, "t={t}");
        }

        // Cumulative return telescopes to last / first - 1.
        let total = *r.cumulative.last().unwrap();
        assert!((total - (60.0 / 50.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn single_point_has_no_defined_returns() {
        let r = prepare_returns(&series(&[42.0]), PriceField::Adjusted).unwrap();
        assert_eq!(r.returns, vec![None]);
        assert_eq!(r.cumulative, vec![0.0]);
    }

    #[test]
    fn pct_change_empty() {
        assert!(pct_change(&[]).is_empty());
    }
}
