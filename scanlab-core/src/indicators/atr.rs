//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), TR[0] = high-low.
//! ATR = simple rolling mean of TR over `period` bars.
//! Lookback: period - 1.
//!
//! `wilder_smooth` lives here as well; ADX uses it for its directional sums.

use super::window::WindowOps;

/// Compute the True Range series.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let n = highs.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = highs[0] - lows[0];

    for i in 1..n {
        let (h, l, pc) = (highs[i], lows[i], closes[i - 1]);
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

pub fn atr(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    w: &dyn WindowOps,
) -> Vec<f64> {
    w.rolling_mean(&true_range(highs, lows, closes), period)
}

/// Apply Wilder smoothing to a series. Alpha = 1/period.
/// Seed: mean of the first run of `period` consecutive non-NaN values.
/// A NaN after the seed taints the remainder.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let mut run = 0usize;
    let mut seed_end = None;
    for (i, v) in values.iter().enumerate() {
        if v.is_nan() {
            run = 0;
            continue;
        }
        run += 1;
        if run == period {
            seed_end = Some(i + 1);
            break;
        }
    }

    let Some(seed_end) = seed_end else {
        return result;
    };

    let seed: f64 = values[seed_end - period..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;

    for i in seed_end..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, NaiveWindows, StreamingWindows, DEFAULT_EPSILON};

    fn columns(data: &[(f64, f64, f64)]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            data.iter().map(|d| d.0).collect(),
            data.iter().map(|d| d.1).collect(),
            data.iter().map(|d| d.2).collect(),
        )
    }

    #[test]
    fn true_range_basic() {
        let (h, l, c) = columns(&[
            (105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&h, &l, &c);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let (h, l, c) = columns(&[(102.0, 97.0, 100.0), (115.0, 108.0, 112.0)]);
        let tr = true_range(&h, &l, &c);
        // max(7, |115-100|, |108-100|) = 15
        assert_approx(tr[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_is_rolling_mean_of_true_range() {
        let (h, l, c) = columns(&[
            (105.0, 95.0, 102.0),  // 10
            (108.0, 100.0, 106.0), // 8
            (107.0, 98.0, 99.0),   // 9
            (101.0, 97.0, 100.0),  // 4
        ]);
        for w in [&NaiveWindows as &dyn WindowOps, &StreamingWindows] {
            let result = atr(&h, &l, &c, 3, w);
            assert!(result[0].is_nan());
            assert!(result[1].is_nan());
            assert_approx(result[2], 9.0, 1e-9);
            assert_approx(result[3], 7.0, 1e-9);
        }
    }

    #[test]
    fn atr_constant_range() {
        let h = vec![11.0; 30];
        let l = vec![9.0; 30];
        let c = vec![10.0; 30];
        let result = atr(&h, &l, &c, 14, &NaiveWindows);
        assert!(result[12].is_nan());
        assert_approx(result[13], 2.0, DEFAULT_EPSILON);
        assert_approx(result[29], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_known_values() {
        // period 2: seed mean(2, 4) = 3 at idx 2; then 0.5*6 + 0.5*3 = 4.5
        let result = wilder_smooth(&[f64::NAN, 2.0, 4.0, 6.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        assert_approx(result[3], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_seed_skips_broken_runs() {
        let result = wilder_smooth(&[1.0, f64::NAN, 2.0, 4.0], 2);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
    }
}
