// =============================================================================
// Shared types used across StockSense
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One cleaned daily record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// Bar with every price field set to `price` (handy for tests and
    /// synthetic series).
    #[cfg(test)]
    pub fn flat(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            adj_close: price,
            volume: 0.0,
        }
    }
}

/// Immutable, date-ascending, deduplicated daily price series.
///
/// The only constructor goes through [`PriceSeries::from_bars`], which sorts
/// and deduplicates, so consumers can rely on strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from already-complete bars. Duplicate dates keep the
    /// last occurrence in input order.
    pub fn from_bars(bars: Vec<PriceBar>) -> Self {
        let mut indexed: Vec<(usize, PriceBar)> = bars.into_iter().enumerate().collect();
        // Stable sort by date, then later input wins on ties.
        indexed.sort_by(|(ia, a), (ib, b)| a.date.cmp(&b.date).then(ia.cmp(ib)));

        let mut bars: Vec<PriceBar> = Vec::with_capacity(indexed.len());
        for (_, bar) in indexed {
            match bars.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => bars.push(bar),
            }
        }

        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Values of the selected price column, oldest first.
    pub fn values(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| field.extract(b)).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Which price column the analysis reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceField {
    /// Split/dividend adjusted close.
    #[default]
    Adjusted,
    /// Raw close.
    Close,
}

impl PriceField {
    pub fn from_use_adjusted(use_adjusted: bool) -> Self {
        if use_adjusted {
            Self::Adjusted
        } else {
            Self::Close
        }
    }

    pub fn extract(self, bar: &PriceBar) -> f64 {
        match self {
            Self::Adjusted => bar.adj_close,
            Self::Close => bar.close,
        }
    }
}

/// Short-term trend decided by SMA(20) vs SMA(50).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmaTrend {
    Up,
    Down,
    Neutral,
}

impl std::fmt::Display for SmaTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "UP (bullish short-term)"),
            Self::Down => write!(f, "DOWN (bearish short-term)"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// RSI zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiClass {
    Oversold,
    Overbought,
    Neutral,
}

impl std::fmt::Display for RsiClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oversold => write!(f, "oversold"),
            Self::Overbought => write!(f, "overbought"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Heuristic used to produce a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastMethod {
    MovingAverage,
    LinearTrend,
}

impl std::fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MovingAverage => write!(f, "Moving Average"),
            Self::LinearTrend => write!(f, "Linear Trend"),
        }
    }
}

/// Round half away from zero to 2 decimals (presentation only).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Placeholder shown wherever an indicator is undefined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an optional number with two decimals, or `N/A`.
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

/// Format an optional date as `YYYY-MM-DD`, or `N/A`.
pub fn fmt_opt_date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string())
}
