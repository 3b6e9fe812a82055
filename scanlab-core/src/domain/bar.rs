//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single symbol at a single timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Midpoint of the bar's range.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        self.first_non_finite().is_some()
    }

    /// Basic OHLC sanity check: high >= low and both bracket open/close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(field, _)| field)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar sequence is empty")]
    Empty,

    #[error("bar {index} is older than its predecessor")]
    OutOfOrder { index: usize },

    #[error("bar {index} repeats the previous timestamp")]
    DuplicateTimestamp { index: usize },

    #[error("bar {index} has a non-finite {field}")]
    NonFinite { index: usize, field: &'static str },
}

/// Check that a bar sequence is strictly ascending by timestamp with finite prices.
pub fn validate_bars(bars: &[Bar]) -> Result<(), BarError> {
    if bars.is_empty() {
        return Err(BarError::Empty);
    }
    for (index, bar) in bars.iter().enumerate() {
        if let Some(field) = bar.first_non_finite() {
            return Err(BarError::NonFinite { index, field });
        }
        if index > 0 {
            let prev = &bars[index - 1].timestamp;
            if bar.timestamp == *prev {
                return Err(BarError::DuplicateTimestamp { index });
            }
            if bar.timestamp < *prev {
                return Err(BarError::OutOfOrder { index });
            }
        }
    }
    Ok(())
}
