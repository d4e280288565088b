// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The series is seeded with the first observed value (not an SMA of the first
// `period` values), so every index is defined.
// =============================================================================

/// Compute the EMA series for `closes`, one value per input.
///
/// Returns an empty `Vec` for empty input or `period == 0`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    let Some((&first, rest)) = closes.split_first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    let mut result = Vec::with_capacity(closes.len());
    result.push(first);

    let mut prev_ema = first;
    for &close in rest {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        result.push(ema);
        prev_ema = ema;
    }

    result
}
