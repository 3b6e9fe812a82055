//! Keltner Channel: EMA +/- ATR multiplier.
//!
//! - Middle: EMA(close, span)
//! - Upper: middle + k * ATR
//! - Lower: middle - k * ATR
//!
//! The ATR series is supplied by the caller (the pipeline's `atr` output),
//! so the channel's warm-up follows the ATR's.

use super::ema::ema;
use super::Bands;

pub fn keltner(closes: &[f64], atr: &[f64], span: usize, k: f64) -> Bands {
    Bands::around(ema(closes, span), atr, k)
}
