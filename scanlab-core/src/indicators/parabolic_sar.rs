//! Parabolic SAR: Wilder's acceleration factor system.
//!
//! Inherently sequential: carries direction, extreme point (EP) and
//! acceleration factor (AF) from bar to bar.
//!
//! Parameters: af_start (default 0.02), af_step (default 0.02), af_max (default 0.20).
//! Lookback: 1 (needs at least 2 bars to start).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SarParams {
    pub af_start: f64,
    pub af_step: f64,
    pub af_max: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.20,
        }
    }
}

pub fn parabolic_sar(highs: &[f64], lows: &[f64], closes: &[f64], p: SarParams) -> Vec<f64> {
    let n = highs.len();
    let mut result = vec![f64::NAN; n];

    if n < 2 {
        return result;
    }

    if [highs[0], lows[0], highs[1], lows[1]].iter().any(|v| v.is_nan()) {
        return result;
    }

    // Initial direction from the first two closes
    let mut is_long = closes[1] >= closes[0];
    let mut af = p.af_start;
    let (mut sar, mut ep) = if is_long {
        (lows[0], highs[1])
    } else {
        (highs[0], lows[1])
    };

    result[1] = sar;

    for i in 2..n {
        if highs[i].is_nan() || lows[i].is_nan() || closes[i].is_nan() {
            continue;
        }

        let mut next = sar + af * (ep - sar);

        if is_long {
            // SAR may not sit above either of the two previous lows
            for prev in [lows[i - 1], lows[i - 2]] {
                if !prev.is_nan() {
                    next = next.min(prev);
                }
            }

            if lows[i] < next {
                is_long = false;
                next = ep;
                ep = lows[i];
                af = p.af_start;
            } else if highs[i] > ep {
                ep = highs[i];
                af = (af + p.af_step).min(p.af_max);
            }
        } else {
            // SAR may not sit below either of the two previous highs
            for prev in [highs[i - 1], highs[i - 2]] {
                if !prev.is_nan() {
                    next = next.max(prev);
                }
            }

            if highs[i] > next {
                is_long = true;
                next = ep;
                ep = highs[i];
                af = p.af_start;
            } else if lows[i] < ep {
                ep = lows[i];
                af = (af + p.af_step).min(p.af_max);
            }
        }

        sar = next;
        result[i] = sar;
    }

    result
}
