// =============================================================================
// Trailing Volatility
// =============================================================================
//
// A single point-in-time figure, not a rolling series:
//
//   σ   = sample std-dev (n - 1) of the last `window` daily returns
//   vol = σ × 100                      (percent)
//   vol = σ × √252 × 100               (annualized, trading-day convention)
//
// The tail is taken from the aligned return series, so when the series is no
// longer than `window` the undefined first return simply drops out.

/// Default look-back used by the analysis summary.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Trailing volatility in percent from aligned daily `returns`.
///
/// Returns `None` when fewer than two returns fall inside the window.
pub fn calculate_volatility(returns: &[Option<f64>], window: usize, annualize: bool) -> Option<f64> {
    let tail_start = returns.len().saturating_sub(window);
    let tail: Vec<f64> = returns[tail_start..].iter().flatten().copied().collect();

    let mut std_dev = sample_std_dev(&tail)?;
    if annualize {
        std_dev *= TRADING_DAYS_PER_YEAR.sqrt();
    }

    Some(std_dev * 100.0)
}

/// Sample standard deviation (Bessel-corrected). `None` below two points.
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

    let std_dev = variance.sqrt();
    std_dev.is_finite().then_some(std_dev)
}
