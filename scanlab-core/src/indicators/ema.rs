//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA[first] = x[first], where `first` is the first finite input.
//! No warm-up beyond leading NaN input; a NaN after seeding taints the rest.

/// EMA of an arbitrary series.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if span == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = values[start];
    result[start] = prev;

    for i in (start + 1)..n {
        if values[i].is_nan() {
            // NaN propagates: once we see NaN, subsequent values are tainted
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_input() {
        let result = ema(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        let result = ema(&[10.0, 11.0, 12.0], 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let values = vec![42.5; 300];
        let result = ema(&values, 200);
        for v in &result {
            assert_approx(*v, 42.5, 1e-9);
        }
    }

    #[test]
    fn ema_converges_after_level_shift() {
        let mut values = vec![10.0; 5];
        values.extend(std::iter::repeat(50.0).take(200));
        let result = ema(&values, 12);
        assert_approx(*result.last().unwrap(), 50.0, 1e-9);
    }

    #[test]
    fn ema_seeds_after_leading_nan() {
        let result = ema(&[f64::NAN, f64::NAN, 4.0, 6.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 4.0, DEFAULT_EPSILON);
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_after_seed_taints_remainder() {
        let result = ema(&[1.0, 2.0, f64::NAN, 4.0], 3);
        assert!(!result[1].is_nan());
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn ema_zero_span_is_undefined() {
        assert!(ema(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }
}
