//! SuperTrend: ATR band indicator with a two-state direction machine.
//!
//! basic_upper = hl2 + multiplier * ATR, basic_lower = hl2 - multiplier * ATR.
//! Final bands only tighten toward price: a band takes the new basic value
//! when that value is tighter, or when the previous close crossed the band;
//! otherwise it carries over.
//! Direction: DOWN when close <= lower, UP when close >= upper, else unchanged.
//! Output: lower band while UP (support), upper band while DOWN (resistance).
//!
//! The ATR series is supplied by the caller; output starts at its first defined value.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    pub fn as_f64(&self) -> f64 {
        match self {
            TrendDirection::Up => 1.0,
            TrendDirection::Down => -1.0,
        }
    }
}

/// Carry between consecutive bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperTrendState {
    pub upper: f64,
    pub lower: f64,
    pub direction: TrendDirection,
}

impl SuperTrendState {
    /// Initial state on the first bar with a defined ATR. Starts UP unless the
    /// close is already at or below the lower band.
    pub fn start(close: f64, basic_upper: f64, basic_lower: f64) -> Self {
        let direction = if close <= basic_lower {
            TrendDirection::Down
        } else {
            TrendDirection::Up
        };
        Self {
            upper: basic_upper,
            lower: basic_lower,
            direction,
        }
    }

    pub fn step(self, prev_close: f64, close: f64, basic_upper: f64, basic_lower: f64) -> Self {
        let upper = if basic_upper < self.upper || prev_close > self.upper {
            basic_upper
        } else {
            self.upper
        };
        let lower = if basic_lower > self.lower || prev_close < self.lower {
            basic_lower
        } else {
            self.lower
        };

        let direction = if close <= lower {
            TrendDirection::Down
        } else if close >= upper {
            TrendDirection::Up
        } else {
            self.direction
        };

        Self {
            upper,
            lower,
            direction,
        }
    }

    pub fn value(&self) -> f64 {
        match self.direction {
            TrendDirection::Up => self.lower,
            TrendDirection::Down => self.upper,
        }
    }
}

pub struct SuperTrend {
    pub value: Vec<f64>,
    /// +1.0 while UP, -1.0 while DOWN.
    pub direction: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn supertrend(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    atr: &[f64],
    multiplier: f64,
) -> SuperTrend {
    let n = closes.len();
    let mut out = SuperTrend {
        value: vec![f64::NAN; n],
        direction: vec![f64::NAN; n],
        upper: vec![f64::NAN; n],
        lower: vec![f64::NAN; n],
    };

    let mut state: Option<SuperTrendState> = None;
    for i in 0..n {
        let hl2 = (highs[i] + lows[i]) / 2.0;
        let basic_upper = hl2 + multiplier * atr[i];
        let basic_lower = hl2 - multiplier * atr[i];
        if basic_upper.is_nan() || basic_lower.is_nan() || closes[i].is_nan() {
            continue;
        }

        let next = match state {
            None => SuperTrendState::start(closes[i], basic_upper, basic_lower),
            Some(s) => s.step(closes[i - 1], closes[i], basic_upper, basic_lower),
        };

        out.value[i] = next.value();
        out.direction[i] = next.direction.as_f64();
        out.upper[i] = next.upper;
        out.lower[i] = next.lower;
        state = Some(next);
    }

    out
}
