//! Signal detection: discrete crossover and reversal events on the latest bars.
//!
//! The detector only looks at the last three bars of precomputed indicator
//! series. A pattern whose inputs are undefined simply does not fire.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Signal, SignalStrength, SignalType};
use crate::pipeline::{names, IndicatorSeries};

pub const GOLDEN_CROSS: &str = "golden cross";
pub const DEATH_CROSS: &str = "death cross";
pub const RSI_OVERSOLD_REVERSAL: &str = "RSI oversold reversal";
pub const RSI_OVERBOUGHT_REVERSAL: &str = "RSI overbought reversal";
pub const BAND_BREAKOUT: &str = "band breakout + volume";
pub const MACD_CROSS: &str = "MACD cross";

/// Thresholds for the reversal and breakout patterns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalDetector {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub breakout_volume_ratio: f64,
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            breakout_volume_ratio: 2.0,
        }
    }
}

impl SignalDetector {
    /// Signals on the latest bar, in pattern order. Empty when nothing matches.
    pub fn detect(&self, bars: &[Bar], series: &IndicatorSeries) -> Vec<Signal> {
        let mut signals = Vec::new();

        match cross(series, names::EMA_MEDIUM, names::EMA_LONG, 2) {
            Some(Cross::Above) => signals.push(Signal::new(
                SignalType::Buy,
                GOLDEN_CROSS,
                SignalStrength::Strong,
            )),
            Some(Cross::Below) => signals.push(Signal::new(
                SignalType::Short,
                DEATH_CROSS,
                SignalStrength::Strong,
            )),
            None => {}
        }

        if let (Some(rsi), Some(prev)) = (series.latest(names::RSI), series.back(names::RSI, 1)) {
            if rsi < self.rsi_oversold && rsi > prev {
                signals.push(Signal::new(
                    SignalType::Buy,
                    RSI_OVERSOLD_REVERSAL,
                    SignalStrength::Medium,
                ));
            }
            if rsi > self.rsi_overbought && rsi < prev {
                signals.push(Signal::new(
                    SignalType::Short,
                    RSI_OVERBOUGHT_REVERSAL,
                    SignalStrength::Medium,
                ));
            }
        }

        if let (Some(bar), Some(upper), Some(ratio)) = (
            bars.last(),
            series.latest(names::BB_UPPER),
            series.latest(names::VOLUME_RATIO),
        ) {
            if bar.close > upper && ratio > self.breakout_volume_ratio {
                signals.push(Signal::new(
                    SignalType::Buy,
                    BAND_BREAKOUT,
                    SignalStrength::Strong,
                ));
            }
        }

        match cross(series, names::MACD, names::MACD_SIGNAL, 1) {
            Some(Cross::Above) => signals.push(Signal::new(
                SignalType::Buy,
                MACD_CROSS,
                SignalStrength::Medium,
            )),
            Some(Cross::Below) => signals.push(Signal::new(
                SignalType::Short,
                MACD_CROSS,
                SignalStrength::Medium,
            )),
            None => {}
        }

        signals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cross {
    Above,
    Below,
}

/// Did `fast` cross `slow` on the latest bar after staying on the other side
/// for the previous `prior` bars?
fn cross(series: &IndicatorSeries, fast: &str, slow: &str, prior: usize) -> Option<Cross> {
    let spread = |offset: usize| -> Option<f64> {
        Some(series.back(fast, offset)? - series.back(slow, offset)?)
    };

    let now = spread(0)?;
    let before: Vec<f64> = (1..=prior).map(spread).collect::<Option<_>>()?;

    if now > 0.0 && before.iter().all(|&d| d < 0.0) {
        Some(Cross::Above)
    } else if now < 0.0 && before.iter().all(|&d| d > 0.0) {
        Some(Cross::Below)
    } else {
        None
    }
}
