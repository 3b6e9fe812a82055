//! Concrete indicator implementations.
//!
//! Each module exposes plain functions over price/volume slices that return
//! index-aligned `Vec<f64>` series, with NaN marking undefined positions.
//! Rolling-window indicators take a `&dyn WindowOps` so the same formula runs
//! on either the reference or the streaming window kernels; recurrences
//! (EMA, RSI, ADX, SAR, SuperTrend, cumulative volume measures) fold
//! sequentially over the whole series and have a single implementation.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod donchian;
pub mod ema;
pub mod ichimoku;
pub mod keltner;
pub mod levels;
pub mod macd;
pub mod mfi;
pub mod parabolic_sar;
pub mod rsi;
pub mod stochastic;
pub mod supertrend;
pub mod volume;
pub mod window;

pub use window::{NaiveWindows, StreamingWindows, WindowOps};

use crate::domain::Bar;

/// Column extractors shared by the indicator functions.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn highs(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.high).collect()
}

pub fn lows(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.low).collect()
}

pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume as f64).collect()
}

/// Upper/middle/lower channel triple (Bollinger, Keltner, Donchian).
#[derive(Debug, Clone)]
pub struct Bands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl Bands {
    /// `middle ± k * width`, NaN wherever either input is NaN.
    pub(crate) fn around(middle: Vec<f64>, width: &[f64], k: f64) -> Self {
        let upper = zip_with(&middle, width, |m, w| m + k * w);
        let lower = zip_with(&middle, width, |m, w| m - k * w);
        Self {
            upper,
            middle,
            lower,
        }
    }
}

/// Element-wise combination of two aligned series; NaN in either input yields NaN.
pub(crate) fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            if x.is_nan() || y.is_nan() {
                f64::NAN
            } else {
                f(x, y)
            }
        })
        .collect()
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let data: Vec<(f64, f64, f64, f64, u64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close, 1000)
        })
        .collect();
    make_ohlcv_bars(&data)
}

/// Create bars from explicit (open, high, low, close, volume) tuples, one per day.
#[cfg(test)]
pub fn make_ohlcv_bars(data: &[(f64, f64, f64, f64, u64)]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| Bar {
            symbol: "TEST".to_string(),
            timestamp: base + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
