//! Stochastic oscillator (%K/%D) and Williams %R.
//!
//! %K = 100 * (close - LL) / (HH - LL) over `k_period` bars.
//! %D = simple average of the last `d_period` %K values.
//! Williams %R = -100 * (HH - close) / (HH - LL).
//! A window with HH == LL has no defined position within its range and yields NaN.

use super::window::WindowOps;

pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
    w: &dyn WindowOps,
) -> Stochastic {
    let hh = w.rolling_max(highs, k_period);
    let ll = w.rolling_min(lows, k_period);

    let k: Vec<f64> = (0..closes.len())
        .map(|i| position_in_range(closes[i], hh[i], ll[i]).map_or(f64::NAN, |p| 100.0 * p))
        .collect();
    let d = w.rolling_mean(&k, d_period);

    Stochastic { k, d }
}

pub fn williams_r(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    w: &dyn WindowOps,
) -> Vec<f64> {
    let hh = w.rolling_max(highs, period);
    let ll = w.rolling_min(lows, period);

    (0..closes.len())
        .map(|i| {
            position_in_range(closes[i], hh[i], ll[i]).map_or(f64::NAN, |p| -100.0 * (1.0 - p))
        })
        .collect()
}

/// (close - low) / (high - low), or None when undefined.
fn position_in_range(close: f64, high: f64, low: f64) -> Option<f64> {
    let range = high - low;
    if close.is_nan() || range.is_nan() || range == 0.0 {
        None
    } else {
        Some((close - low) / range)
    }
}
