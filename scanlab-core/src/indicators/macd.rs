//! MACD: Moving Average Convergence Divergence.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal_span)
//! histogram = line - signal
//!
//! All three EMAs seed on their first input, so MACD has no warm-up prefix.

use serde::{Deserialize, Serialize};

use super::ema::ema;
use super::zip_with;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl MacdParams {
    /// 12/26/9
    pub const STANDARD: Self = Self {
        fast: 12,
        slow: 26,
        signal: 9,
    };

    /// 3/10/16, quicker to react to short swings
    pub const FAST: Self = Self {
        fast: 3,
        slow: 10,
        signal: 16,
    };
}

pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let line = zip_with(&ema(closes, fast), &ema(closes, slow), |f, s| f - s);
    let signal = ema(&line, signal_span);
    let histogram = zip_with(&line, &signal, |l, s| l - s);
    Macd {
        line,
        signal,
        histogram,
    }
}
