//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + k * stddev(close, period)
//! - Lower: middle - k * stddev(close, period)
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::window::WindowOps;
use super::Bands;

pub fn bollinger(closes: &[f64], period: usize, k: f64, w: &dyn WindowOps) -> Bands {
    let middle = w.rolling_mean(closes, period);
    let std = w.rolling_std(closes, period);
    Bands::around(middle, &std, k)
}
