// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (x_{t-period+1} + ... + x_t) / period
//
// No partial-window averaging: indices before `period - 1` are `None`.

/// Compute the SMA series for `values`, aligned 1:1 with the input.
///
/// Exactly `values.len() - period + 1` entries are defined (none when the
/// input is shorter than `period`). `period == 0` yields all `None`.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    let period_f = period as f64;
    for (i, window) in values.windows(period).enumerate() {
        let mean = window.iter().sum::<f64>() / period_f;
        result[i + period - 1] = Some(mean);
    }

    result
}

/// Most recent SMA value, or `None` with fewer than `period` points.
pub fn latest_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}
