// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators behind the
// analysis summary. Windowed series are aligned 1:1 with their input and use
// `Option<f64>`: `None` until the window is satisfied, never zero.

pub mod drawdown;
pub mod ema;
pub mod returns;
pub mod rsi;
pub mod sma;
pub mod volatility;

use crate::error::Result;
use crate::types::{PriceField, PriceSeries, RsiClass};

use self::drawdown::{calculate_max_drawdown, DrawdownResult};
use self::returns::{prepare_returns, ReturnSeries};

/// Last element of an aligned indicator series, if it is defined.
pub fn latest(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Every indicator for one price series, computed on demand from the
/// selected column. Built fresh per analysis; nothing is cached.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    prices: Vec<f64>,
    returns: ReturnSeries,
}

impl IndicatorSet {
    /// Fails with `InvalidInput` on an empty series.
    pub fn new(series: &PriceSeries, field: PriceField) -> Result<Self> {
        Ok(Self {
            returns: prepare_returns(series, field)?,
            prices: series.values(field),
        })
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn sma(&self, window: usize) -> Vec<Option<f64>> {
        sma::calculate_sma(&self.prices, window)
    }

    pub fn ema(&self, window: usize) -> Vec<f64> {
        ema::calculate_ema(&self.prices, window)
    }

    pub fn rsi(&self, window: usize) -> Vec<Option<f64>> {
        rsi::calculate_rsi(&self.prices, window)
    }

    /// Latest SMA, `None` with fewer than `window` prices.
    pub fn latest_sma(&self, window: usize) -> Option<f64> {
        sma::latest_sma(&self.prices, window)
    }

    /// Latest RSI with its zone, `None` with `window` or fewer prices.
    pub fn current_rsi(&self, window: usize) -> Option<(f64, RsiClass)> {
        let value = latest(&self.rsi(window))?;
        Some((value, rsi::classify_rsi(value)))
    }

    pub fn volatility(&self, window: usize, annualize: bool) -> Option<f64> {
        volatility::calculate_volatility(&self.returns.returns, window, annualize)
    }

    pub fn drawdown(&self) -> Option<DrawdownResult> {
        calculate_max_drawdown(&self.returns)
    }
}
