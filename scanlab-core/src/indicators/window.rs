//! Rolling-window kernels.
//!
//! A rolling output at index `i` is defined only when `i >= window - 1` and
//! every input inside `[i + 1 - window, i]` is finite. Both kernels honour the
//! same contract; `NaiveWindows` recomputes each window from scratch and is the
//! reference, `StreamingWindows` updates running state in O(1) per step
//! (O(1) amortised for extrema).

use std::collections::VecDeque;

pub trait WindowOps: Send + Sync {
    fn rolling_sum(&self, values: &[f64], window: usize) -> Vec<f64>;

    /// Sample standard deviation (n - 1 denominator).
    fn rolling_std(&self, values: &[f64], window: usize) -> Vec<f64>;

    fn rolling_max(&self, values: &[f64], window: usize) -> Vec<f64>;

    fn rolling_min(&self, values: &[f64], window: usize) -> Vec<f64>;

    fn rolling_mean(&self, values: &[f64], window: usize) -> Vec<f64> {
        let divisor = window as f64;
        self.rolling_sum(values, window)
            .into_iter()
            .map(|s| s / divisor)
            .collect()
    }
}

/// Recomputes every window. O(n * window).
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveWindows;

impl NaiveWindows {
    fn each_window(
        values: &[f64],
        window: usize,
        f: impl Fn(&[f64]) -> f64,
    ) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if window == 0 || n < window {
            return result;
        }
        for i in (window - 1)..n {
            let slice = &values[i + 1 - window..=i];
            if slice.iter().all(|v| v.is_finite()) {
                result[i] = f(slice);
            }
        }
        result
    }
}

impl WindowOps for NaiveWindows {
    fn rolling_sum(&self, values: &[f64], window: usize) -> Vec<f64> {
        Self::each_window(values, window, |w| w.iter().sum())
    }

    fn rolling_std(&self, values: &[f64], window: usize) -> Vec<f64> {
        if window < 2 {
            return vec![f64::NAN; values.len()];
        }
        Self::each_window(values, window, |w| {
            let mean = w.iter().sum::<f64>() / w.len() as f64;
            let ss: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (w.len() - 1) as f64).sqrt()
        })
    }

    fn rolling_max(&self, values: &[f64], window: usize) -> Vec<f64> {
        Self::each_window(values, window, |w| {
            w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        })
    }

    fn rolling_min(&self, values: &[f64], window: usize) -> Vec<f64> {
        Self::each_window(values, window, |w| {
            w.iter().copied().fold(f64::INFINITY, f64::min)
        })
    }
}

/// Incremental kernels: running sums and monotonic deques.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingWindows;

impl StreamingWindows {
    /// Monotonic deque over finite values; `keeps(front, x)` is true when an
    /// older value `front` still dominates the incoming `x`.
    fn rolling_extreme(values: &[f64], window: usize, keeps: fn(f64, f64) -> bool) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if window == 0 || n < window {
            return result;
        }

        let mut deque: VecDeque<usize> = VecDeque::with_capacity(window);
        let mut last_bad: Option<usize> = None;

        for (i, &x) in values.iter().enumerate() {
            if x.is_finite() {
                while let Some(&j) = deque.back() {
                    if keeps(values[j], x) {
                        break;
                    }
                    deque.pop_back();
                }
                deque.push_back(i);
            } else {
                last_bad = Some(i);
                deque.clear();
            }

            while let Some(&j) = deque.front() {
                if j + window <= i {
                    deque.pop_front();
                } else {
                    break;
                }
            }

            let clean = last_bad.map_or(true, |b| b + window <= i);
            if i + 1 >= window && clean {
                if let Some(&j) = deque.front() {
                    result[i] = values[j];
                }
            }
        }

        result
    }
}

impl WindowOps for StreamingWindows {
    fn rolling_sum(&self, values: &[f64], window: usize) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if window == 0 || n < window {
            return result;
        }

        let mut sum = 0.0;
        let mut bad = 0usize;
        for i in 0..n {
            let entering = values[i];
            if entering.is_finite() {
                sum += entering;
            } else {
                bad += 1;
            }
            if i >= window {
                let leaving = values[i - window];
                if leaving.is_finite() {
                    sum -= leaving;
                } else {
                    bad -= 1;
                }
            }
            if i + 1 >= window && bad == 0 {
                result[i] = sum;
            }
        }

        result
    }

    fn rolling_std(&self, values: &[f64], window: usize) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if window < 2 || n < window {
            return result;
        }

        // Sliding Welford update over finite values only.
        let mut count = 0usize;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut bad = 0usize;

        for i in 0..n {
            let x = values[i];
            if x.is_finite() {
                count += 1;
                let delta = x - mean;
                mean += delta / count as f64;
                m2 += delta * (x - mean);
            } else {
                bad += 1;
            }

            if i >= window {
                let y = values[i - window];
                if y.is_finite() {
                    count -= 1;
                    if count == 0 {
                        mean = 0.0;
                        m2 = 0.0;
                    } else {
                        let delta = y - mean;
                        mean -= delta / count as f64;
                        m2 -= delta * (y - mean);
                    }
                } else {
                    bad -= 1;
                }
            }

            if i + 1 >= window && bad == 0 {
                result[i] = (m2.max(0.0) / (window - 1) as f64).sqrt();
            }
        }

        result
    }

    fn rolling_max(&self, values: &[f64], window: usize) -> Vec<f64> {
        Self::rolling_extreme(values, window, |front, x| front > x)
    }

    fn rolling_min(&self, values: &[f64], window: usize) -> Vec<f64> {
        Self::rolling_extreme(values, window, |front, x| front < x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    const KERNELS: [&dyn WindowOps; 2] = [&NaiveWindows, &StreamingWindows];

    #[test]
    fn sum_and_mean_known_values() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        for w in KERNELS {
            let sums = w.rolling_sum(&values, 3);
            assert!(sums[0].is_nan());
            assert!(sums[1].is_nan());
            assert_approx(sums[2], 6.0, DEFAULT_EPSILON);
            assert_approx(sums[4], 12.0, DEFAULT_EPSILON);

            let means = w.rolling_mean(&values, 3);
            assert_approx(means[3], 3.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn sample_std_known_values() {
        // Window [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, sum of squares 32, sample var 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        for w in KERNELS {
            let std = w.rolling_std(&values, 8);
            assert_approx(std[7], (32.0f64 / 7.0).sqrt(), 1e-9);
        }
    }

    #[test]
    fn extrema_track_window() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0, 0.5, 6.0];
        for w in KERNELS {
            let max = w.rolling_max(&values, 3);
            let min = w.rolling_min(&values, 3);
            assert_eq!(&max[2..], &[5.0, 4.0, 4.0, 3.0, 6.0]);
            assert_eq!(&min[2..], &[1.0, 1.0, 2.0, 0.5, 0.5]);
        }
    }

    #[test]
    fn nan_blanks_every_window_it_touches() {
        let values = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 7.0];
        for w in KERNELS {
            for series in [
                w.rolling_sum(&values, 3),
                w.rolling_max(&values, 3),
                w.rolling_min(&values, 3),
                w.rolling_std(&values, 3),
            ] {
                assert!(series[2].is_nan());
                assert!(series[3].is_nan());
                assert!(series[4].is_nan());
                assert!(!series[5].is_nan());
                assert!(!series[6].is_nan());
            }
        }
    }

    #[test]
    fn window_longer_than_input_is_all_nan() {
        let values = [1.0, 2.0];
        for w in KERNELS {
            assert!(w.rolling_sum(&values, 3).iter().all(|v| v.is_nan()));
            assert!(w.rolling_max(&values, 0).iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn kernels_agree_on_noisy_input() {
        let values: Vec<f64> = (0..200)
            .map(|i| 100.0 + ((i * 37) % 23) as f64 * 0.7 - ((i * 11) % 7) as f64)
            .collect();
        for window in [1, 2, 5, 20] {
            let pairs = [
                (
                    NaiveWindows.rolling_sum(&values, window),
                    StreamingWindows.rolling_sum(&values, window),
                ),
                (
                    NaiveWindows.rolling_std(&values, window),
                    StreamingWindows.rolling_std(&values, window),
                ),
                (
                    NaiveWindows.rolling_max(&values, window),
                    StreamingWindows.rolling_max(&values, window),
                ),
                (
                    NaiveWindows.rolling_min(&values, window),
                    StreamingWindows.rolling_min(&values, window),
                ),
            ];
            for (reference, streaming) in pairs {
                for (a, b) in reference.iter().zip(&streaming) {
                    if a.is_nan() {
                        assert!(b.is_nan());
                    } else {
                        assert!((a - b).abs() <= 1e-7 * a.abs().max(1.0), "{a} vs {b}");
                    }
                }
            }
        }
    }
}
