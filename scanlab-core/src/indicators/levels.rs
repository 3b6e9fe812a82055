//! Support and resistance levels.
//!
//! Classic floor pivots from each bar's own high/low/close:
//! P = (H + L + C) / 3, R1 = 2P - L, S1 = 2P - H, R2 = P + (H - L), S2 = P - (H - L).
//! Range extremes: rolling max of highs / min of lows over a window.

use super::window::WindowOps;

pub struct Pivots {
    pub pivot: Vec<f64>,
    pub r1: Vec<f64>,
    pub s1: Vec<f64>,
    pub r2: Vec<f64>,
    pub s2: Vec<f64>,
}

pub fn pivots(highs: &[f64], lows: &[f64], closes: &[f64]) -> Pivots {
    let n = closes.len();
    let mut out = Pivots {
        pivot: Vec::with_capacity(n),
        r1: Vec::with_capacity(n),
        s1: Vec::with_capacity(n),
        r2: Vec::with_capacity(n),
        s2: Vec::with_capacity(n),
    };
    for i in 0..n {
        let (h, l) = (highs[i], lows[i]);
        let p = (h + l + closes[i]) / 3.0;
        out.pivot.push(p);
        out.r1.push(2.0 * p - l);
        out.s1.push(2.0 * p - h);
        out.r2.push(p + (h - l));
        out.s2.push(p - (h - l));
    }
    out
}

pub struct Range {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
}

pub fn range_extremes(highs: &[f64], lows: &[f64], period: usize, w: &dyn WindowOps) -> Range {
    Range {
        high: w.rolling_max(highs, period),
        low: w.rolling_min(lows, period),
    }
}
