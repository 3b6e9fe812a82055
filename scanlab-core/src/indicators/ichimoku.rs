//! Ichimoku Kinko Hyo.
//!
//! - Tenkan-sen: (HH + LL) / 2 over `tenkan` bars
//! - Kijun-sen: (HH + LL) / 2 over `kijun` bars
//! - Senkou A: (tenkan + kijun) / 2, plotted `displacement` bars ahead
//! - Senkou B: (HH + LL) / 2 over `senkou_b` bars, plotted `displacement` bars ahead
//! - Chikou: close plotted `displacement` bars behind
//!
//! Output stays aligned with the input: projections beyond the last bar are
//! dropped and vacated positions are NaN.

use serde::{Deserialize, Serialize};

use super::window::WindowOps;
use super::zip_with;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan: 9,
            kijun: 26,
            senkou_b: 52,
            displacement: 26,
        }
    }
}

pub struct Ichimoku {
    pub tenkan: Vec<f64>,
    pub kijun: Vec<f64>,
    pub senkou_a: Vec<f64>,
    pub senkou_b: Vec<f64>,
    pub chikou: Vec<f64>,
}

pub fn ichimoku(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    p: IchimokuParams,
    w: &dyn WindowOps,
) -> Ichimoku {
    let midpoint = |period: usize| {
        zip_with(
            &w.rolling_max(highs, period),
            &w.rolling_min(lows, period),
            |h, l| (h + l) / 2.0,
        )
    };

    let tenkan = midpoint(p.tenkan);
    let kijun = midpoint(p.kijun);
    let span_a = zip_with(&tenkan, &kijun, |t, k| (t + k) / 2.0);
    let span_b = midpoint(p.senkou_b);

    Ichimoku {
        senkou_a: shift_forward(&span_a, p.displacement),
        senkou_b: shift_forward(&span_b, p.displacement),
        chikou: shift_backward(closes, p.displacement),
        tenkan,
        kijun,
    }
}

/// out[i] = values[i - by]; the first `by` positions are NaN.
pub fn shift_forward(values: &[f64], by: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if by < n {
        out[by..].copy_from_slice(&values[..n - by]);
    }
    out
}

/// out[i] = values[i + by]; the last `by` positions are NaN.
pub fn shift_backward(values: &[f64], by: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if by < n {
        out[..n - by].copy_from_slice(&values[by..]);
    }
    out
}
