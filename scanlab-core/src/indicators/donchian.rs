//! Donchian Channel: highest high / lowest low over a lookback window.
//!
//! - Upper: max(high[t-period+1..=t])
//! - Lower: min(low[t-period+1..=t])
//! - Middle: (upper + lower) / 2
//!
//! Lookback: period - 1.

use super::window::WindowOps;
use super::{zip_with, Bands};

pub fn donchian(highs: &[f64], lows: &[f64], period: usize, w: &dyn WindowOps) -> Bands {
    let upper = w.rolling_max(highs, period);
    let lower = w.rolling_min(lows, period);
    let middle = zip_with(&upper, &lower, |u, l| (u + l) / 2.0);
    Bands {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, NaiveWindows};

    #[test]
    fn donchian_tracks_extremes() {
        let highs = [10.0, 12.0, 11.0, 9.0];
        let lows = [8.0, 9.0, 7.0, 8.5];
        let dc = donchian(&highs, &lows, 3, &NaiveWindows);
        assert!(dc.upper[1].is_nan());
        assert_approx(dc.upper[2], 12.0, 1e-12);
        assert_approx(dc.lower[2], 7.0, 1e-12);
        assert_approx(dc.middle[2], 9.5, 1e-12);
        assert_approx(dc.upper[3], 12.0, 1e-12);
        assert_approx(dc.lower[3], 7.0, 1e-12);
    }
}
