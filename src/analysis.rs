// =============================================================================
// Analysis Summary
// =============================================================================
//
// Reduces the latest indicator values of one price series into a flat,
// classified snapshot:
//
//   sma_trend   = UP if SMA(20) > SMA(50), DOWN if <, else NEUTRAL
//   rsi         = RSI(14) with its oversold / overbought / neutral zone
//   volatility  = trailing 30-day std-dev of returns (optionally annualized)
//   drawdown    = maximum drawdown with its peak / trough dates
//
// Indicator math runs at full precision; rounding to 2 decimals happens only
// when the summary is assembled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::indicators::rsi::DEFAULT_RSI_PERIOD;
use crate::indicators::volatility::DEFAULT_VOLATILITY_WINDOW;
use crate::indicators::IndicatorSet;
use crate::types::{round2, PriceField, PriceSeries, RsiClass, SmaTrend};

const SHORT_SMA: usize = 20;
const LONG_SMA: usize = 50;

/// Knobs for a single analysis call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub annualize_volatility: bool,
    pub price_field: PriceField,
}

/// Latest RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiStatus {
    pub value: f64,
    pub classification: RsiClass,
}

impl std::fmt::Display for RsiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} ({})", self.value, self.classification)
    }
}

/// Full snapshot of one analysis. `None` fields are reported as `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub last_close: f64,
    pub sma_trend: SmaTrend,
    pub rsi: Option<RsiStatus>,
    pub volatility_30d_pct: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
    pub drawdown_start: Option<NaiveDate>,
    pub drawdown_end: Option<NaiveDate>,
}

/// Analyze `series`.
///
/// This is the single validation gate of the pipeline: an absent or empty
/// series fails with [`AnalysisError::InvalidInput`] and nothing is produced.
/// Every other input succeeds, with `None` where an indicator is undefined.
pub fn analyze(series: Option<&PriceSeries>, options: AnalysisOptions) -> Result<AnalysisSummary> {
    let series = series
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AnalysisError::InvalidInput("no data provided for analysis".into()))?;

    let indicators = IndicatorSet::new(series, options.price_field)?;

    let last_close = indicators
        .prices()
        .last()
        .copied()
        .ok_or_else(|| AnalysisError::InvalidInput("no data provided for analysis".into()))?;

    let sma_trend = classify_trend(
        indicators.latest_sma(SHORT_SMA),
        indicators.latest_sma(LONG_SMA),
    );

    let rsi = indicators
        .current_rsi(DEFAULT_RSI_PERIOD)
        .map(|(value, classification)| RsiStatus {
            value: round2(value),
            classification,
        });

    let volatility_30d_pct = indicators
        .volatility(DEFAULT_VOLATILITY_WINDOW, options.annualize_volatility)
        .map(round2);

    let drawdown = indicators.drawdown();

    debug!(
        rows = series.len(),
        trend = ?sma_trend,
        rsi = ?rsi.map(|r| r.value),
        "analysis computed"
    );

    Ok(AnalysisSummary {
        last_close: round2(last_close),
        sma_trend,
        rsi,
        volatility_30d_pct,
        max_drawdown_pct: drawdown.map(|d| round2(d.max_drawdown_pct)),
        drawdown_start: drawdown.map(|d| d.peak_date),
        drawdown_end: drawdown.map(|d| d.trough_date),
    })
}

/// Trend from the short and long SMA. Undefined inputs compare as neutral.
pub fn classify_trend(short: Option<f64>, long: Option<f64>) -> SmaTrend {
    match (short, long) {
        (Some(s), Some(l)) if s > l => SmaTrend::Up,
        (Some(s), Some(l)) if s < l => SmaTrend::Down,
        _ => SmaTrend::Neutral,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceBar;

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        PriceSeries::from_bars(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PriceBar::flat(start + chrono::Days::new(i as u64), p))
                .collect(),
        )
    }

    fn wavy(n: usize, drift: f64) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + drift * i as f64 + 3.0 * (i as f64 * 0.7).sin())
            .collect()
    }

    #[test]
    fn absent_series_is_invalid_input() {
        let err = analyze(None, AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn empty_series_is_invalid_input() {
        let empty = PriceSeries::default();
        let err = analyze(Some(&empty), AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn single_point_reports_sentinels() {
        let s = series(&[123.456]);
        let summary = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        assert_eq!(summary.last_close, 123.46);
        assert_eq!(summary.sma_trend, SmaTrend::Neutral);
        assert!(summary.rsi.is_none());
        assert!(summary.volatility_30d_pct.is_none());
        assert!(summary.max_drawdown_pct.is_none());
        assert!(summary.drawdown_start.is_none());
        assert!(summary.drawdown_end.is_none());
    }

    #[test]
    fn uptrend_is_up() {
        let s = series(&wavy(120, 0.8));
        let summary = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        assert_eq!(summary.sma_trend, SmaTrend::Up);
        assert!(summary.rsi.is_some());
        assert!(summary.volatility_30d_pct.unwrap() > 0.0);
        assert!(summary.max_drawdown_pct.unwrap() <= 0.0);
    }

    #[test]
    fn downtrend_is_down() {
        let s = series(&wavy(120, -0.5));
        let summary = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        assert_eq!(summary.sma_trend, SmaTrend::Down);
    }

    #[test]
    fn neutral_without_long_sma() {
        let s = series(&wavy(30, 1.0));
        let summary = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        assert_eq!(summary.sma_trend, SmaTrend::Neutral);
    }

    #[test]
    fn outputs_are_rounded_to_two_decimals() {
        let s = series(&wavy(80, 0.37));
        let summary = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        for v in [
            Some(summary.last_close),
            summary.rsi.map(|r| r.value),
            summary.volatility_30d_pct,
            summary.max_drawdown_pct,
        ]
        .into_iter()
        .flatten()
        {
            assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6, "{v} not rounded");
        }
    }

    #[test]
    fn annualized_volatility_is_larger() {
        let s = series(&wavy(60, 0.2));
        let daily = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        let annual = analyze(
            Some(&s),
            AnalysisOptions {
                annualize_volatility: true,
                ..AnalysisOptions::default()
            },
        )
        .unwrap();
        assert!(annual.volatility_30d_pct.unwrap() > daily.volatility_30d_pct.unwrap() * 15.0);
    }

    #[test]
    fn price_field_switches_column() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = (0..5)
            .map(|i| {
                let mut bar = PriceBar::flat(start + chrono::Days::new(i), 10.0);
                bar.adj_close = 5.0;
                bar
            })
            .collect();
        let s = PriceSeries::from_bars(bars);

        let adjusted = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        let raw = analyze(
            Some(&s),
            AnalysisOptions {
                price_field: PriceField::Close,
                ..AnalysisOptions::default()
            },
        )
        .unwrap();
        assert_eq!(adjusted.last_close, 5.0);
        assert_eq!(raw.last_close, 10.0);
    }

    #[test]
    fn repeated_analysis_is_identical() {
        let s = series(&wavy(90, 0.1));
        let a = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        let b = analyze(Some(&s), AnalysisOptions::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn classify_trend_rules() {
        assert_eq!(classify_trend(Some(2.0), Some(1.0)), SmaTrend::Up);
        assert_eq!(classify_trend(Some(1.0), Some(2.0)), SmaTrend::Down);
        assert_eq!(classify_trend(Some(1.0), Some(1.0)), SmaTrend::Neutral);
        assert_eq!(classify_trend(None, Some(1.0)), SmaTrend::Neutral);
    }
}
