//! Money Flow Index (MFI).
//!
//! Typical price TP = (H + L + C) / 3, raw flow = TP * volume.
//! A bar's flow is positive when TP rose versus the previous bar, negative when it fell.
//! MFI = 100 - 100 / (1 + sum(positive) / sum(negative)) over the last `period` changes.
//! Lookback: period. Zero negative flow → 100; no flow in either direction → NaN.

use super::window::WindowOps;

pub fn mfi(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
    period: usize,
    w: &dyn WindowOps,
) -> Vec<f64> {
    let n = closes.len();
    let tp: Vec<f64> = (0..n).map(|i| (highs[i] + lows[i] + closes[i]) / 3.0).collect();

    let mut positive = vec![f64::NAN; n];
    let mut negative = vec![f64::NAN; n];
    for i in 1..n {
        let flow = tp[i] * volumes[i];
        if flow.is_nan() || tp[i - 1].is_nan() {
            continue;
        }
        let (p, m) = if tp[i] > tp[i - 1] {
            (flow, 0.0)
        } else if tp[i] < tp[i - 1] {
            (0.0, flow)
        } else {
            (0.0, 0.0)
        };
        positive[i] = p;
        negative[i] = m;
    }

    let pos_sum = w.rolling_sum(&positive, period);
    let neg_sum = w.rolling_sum(&negative, period);

    (0..n)
        .map(|i| {
            let (p, m) = (pos_sum[i], neg_sum[i]);
            if p.is_nan() || m.is_nan() {
                f64::NAN
            } else if m == 0.0 && p == 0.0 {
                f64::NAN
            } else if m == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + p / m)
            }
        })
        .collect()
}
