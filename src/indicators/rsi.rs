// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split into gain = max(delta, 0) and loss = max(-delta, 0).
// Step 3 — Exponentially weighted averages with α = 1 / period, using
//          adjusted weights over every observed delta:
//            avg_t = Σ (1-α)^i · x_{t-i}  /  Σ (1-α)^i
//          No value until `period` deltas have been observed.
// Step 4 — RS  = avg_gain / (avg_loss + ε)
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

use crate::types::RsiClass;

/// Default look-back used by the analysis summary.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Additive guard on the average loss.
pub const RS_EPSILON: f64 = 1e-9;

/// Compute the RSI series for `closes`, aligned 1:1 with the input.
///
/// Index 0 is always `None` (no delta). The first defined value sits at index
/// `period`, once `period` deltas exist.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - no down moves => RSI approaches 100 (RS is finite thanks to ε)
/// - no movement at all => RSI is 0, since RS = 0 / ε
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return result;
    }

    let decay = 1.0 - 1.0 / period as f64;

    let mut gain_num = 0.0_f64;
    let mut loss_num = 0.0_f64;
    let mut weight = 0.0_f64;

    for (i, w) in closes.windows(2).enumerate() {
        let delta = w[1] - w[0];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        gain_num = gain + decay * gain_num;
        loss_num = loss + decay * loss_num;
        weight = 1.0 + decay * weight;

        let observed = i + 1;
        if observed >= period {
            let avg_gain = gain_num / weight;
            let avg_loss = loss_num / weight;
            result[observed] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    result
}

/// Map an RSI value onto its conventional zone.
pub fn classify_rsi(value: f64) -> RsiClass {
    if value < 30.0 {
        RsiClass::Oversold
    } else if value > 70.0 {
        RsiClass::Overbought
    } else {
        RsiClass::Neutral
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / (avg_loss + RS_EPSILON);
    100.0 - 100.0 / (1.0 + rs)
}
