//! ADX: Average Directional Index (Wilder), with +DI and -DI.
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! DI lines start at index `period`, ADX at `2 * period - 1`.

use super::atr::{true_range, wilder_smooth};

pub struct Directional {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Directional {
    let n = highs.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let high_diff = highs[i] - highs[i - 1];
        let low_diff = lows[i - 1] - lows[i];
        if high_diff.is_nan() || low_diff.is_nan() {
            continue;
        }
        plus_dm[i] = if high_diff > low_diff && high_diff > 0.0 {
            high_diff
        } else {
            0.0
        };
        minus_dm[i] = if low_diff > high_diff && low_diff > 0.0 {
            low_diff
        } else {
            0.0
        };
    }

    // TR[0] has no previous close; drop it so all three smoothings seed on the same bars.
    let mut tr = true_range(highs, lows, closes);
    if let Some(first) = tr.first_mut() {
        *first = f64::NAN;
    }

    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        let (tr, p, m) = (smooth_tr[i], smooth_plus[i], smooth_minus[i]);
        if tr.is_nan() || p.is_nan() || m.is_nan() || tr == 0.0 {
            continue;
        }
        plus_di[i] = 100.0 * p / tr;
        minus_di[i] = 100.0 * m / tr;

        let di_sum = plus_di[i] + minus_di[i];
        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di[i] - minus_di[i]).abs() / di_sum
        };
    }

    Directional {
        adx: wilder_smooth(&dx, period),
        plus_di,
        minus_di,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(data: &[(f64, f64, f64)]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            data.iter().map(|d| d.0).collect(),
            data.iter().map(|d| d.1).collect(),
            data.iter().map(|d| d.2).collect(),
        )
    }

    #[test]
    fn adx_bounds() {
        let (h, l, c) = columns(&[
            (105.0, 95.0, 102.0),
            (108.0, 100.0, 106.0),
            (107.0, 98.0, 99.0),
            (103.0, 97.0, 101.0),
            (106.0, 100.0, 105.0),
            (110.0, 103.0, 108.0),
            (112.0, 106.0, 110.0),
            (111.0, 104.0, 105.0),
            (109.0, 103.0, 107.0),
            (113.0, 105.0, 112.0),
        ]);
        let d = adx(&h, &l, &c, 3);

        for series in [&d.adx, &d.plus_di, &d.minus_di] {
            for (i, &v) in series.iter().enumerate() {
                if !v.is_nan() {
                    assert!((0.0..=100.0).contains(&v), "out of bounds at bar {i}: {v}");
                }
            }
        }
    }

    #[test]
    fn warmup_positions() {
        let data: Vec<(f64, f64, f64)> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base + 1.0, base - 1.0, base)
            })
            .collect();
        let (h, l, c) = columns(&data);
        let d = adx(&h, &l, &c, 5);
        assert!(d.plus_di[4].is_nan());
        assert!(!d.plus_di[5].is_nan());
        assert!(d.adx[8].is_nan());
        assert!(!d.adx[9].is_nan());
    }

    #[test]
    fn strong_uptrend_favours_plus_di() {
        let data: Vec<(f64, f64, f64)> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let (h, l, c) = columns(&data);
        let d = adx(&h, &l, &c, 5);

        let last = d.adx.len() - 1;
        assert!(d.plus_di[last] > d.minus_di[last]);
        assert!(d.adx[last] > 25.0, "ADX should be elevated, got {}", d.adx[last]);
    }

    #[test]
    fn too_few_bars() {
        let d = adx(&[105.0], &[95.0], &[102.0], 3);
        assert!(d.adx.iter().all(|v| v.is_nan()));
        assert!(d.plus_di.iter().all(|v| v.is_nan()));
    }
}
