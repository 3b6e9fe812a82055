//! Volume-based indicators.
//!
//! - OBV: cumulative sign(close[t] - close[t-1]) * volume[t], OBV[0] = 0.
//! - VWAP: cumulative typical-price * volume / cumulative volume over the whole input.
//! - VWMA: rolling sum(close * volume) / rolling sum(volume).
//! - CMF: rolling sum(MFM * volume) / rolling sum(volume), where the money-flow
//!   multiplier MFM = ((C - L) - (H - C)) / (H - L); a bar with H == L contributes 0.
//! - Volume ratio: volume / SMA(volume).
//!
//! Any zero-volume denominator yields NaN.

use super::window::WindowOps;
use super::zip_with;

pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 {
        return result;
    }

    let mut total = 0.0;
    result[0] = total;
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change.is_nan() || volumes[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        if change > 0.0 {
            total += volumes[i];
        } else if change < 0.0 {
            total -= volumes[i];
        }
        result[i] = total;
    }

    result
}

pub fn vwap(highs: &[f64], lows: &[f64], closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut pv = 0.0;
    let mut vol = 0.0;
    (0..closes.len())
        .map(|i| {
            let tp = (highs[i] + lows[i] + closes[i]) / 3.0;
            pv += tp * volumes[i];
            vol += volumes[i];
            if vol == 0.0 || pv.is_nan() {
                f64::NAN
            } else {
                pv / vol
            }
        })
        .collect()
}

pub fn vwma(closes: &[f64], volumes: &[f64], period: usize, w: &dyn WindowOps) -> Vec<f64> {
    let pv: Vec<f64> = closes.iter().zip(volumes).map(|(c, v)| c * v).collect();
    ratio_of_sums(&pv, volumes, period, w)
}

pub fn cmf(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
    period: usize,
    w: &dyn WindowOps,
) -> Vec<f64> {
    let flow: Vec<f64> = (0..closes.len())
        .map(|i| {
            let range = highs[i] - lows[i];
            let multiplier = if range == 0.0 {
                0.0
            } else {
                ((closes[i] - lows[i]) - (highs[i] - closes[i])) / range
            };
            multiplier * volumes[i]
        })
        .collect();
    ratio_of_sums(&flow, volumes, period, w)
}

pub struct VolumeRatio {
    pub average: Vec<f64>,
    pub ratio: Vec<f64>,
}

pub fn volume_ratio(volumes: &[f64], period: usize, w: &dyn WindowOps) -> VolumeRatio {
    let average = w.rolling_mean(volumes, period);
    let ratio = zip_with(volumes, &average, |v, a| if a == 0.0 { f64::NAN } else { v / a });
    VolumeRatio { average, ratio }
}

fn ratio_of_sums(num: &[f64], den: &[f64], period: usize, w: &dyn WindowOps) -> Vec<f64> {
    let num = w.rolling_sum(num, period);
    let den = w.rolling_sum(den, period);
    zip_with(&num, &den, |n, d| if d == 0.0 { f64::NAN } else { n / d })
}
