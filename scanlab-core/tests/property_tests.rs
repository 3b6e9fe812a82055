//! Property tests for pipeline and scoring invariants.
//!
//! Uses proptest to verify:
//! 1. Alignment: every series has exactly one value per bar
//! 2. RSI bounds: every defined RSI value lies in [0, 100]
//! 3. Backend equivalence: reference and optimized agree within tolerance
//! 4. Idempotence: repeated runs produce bit-identical output
//! 5. Classification monotonicity: a higher score never ranks lower
//! 6. Sizing: the plan never risks more than the budget

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use scanlab_core::domain::{Bar, SignalType};
use scanlab_core::indicators::{ema, rsi};
use scanlab_core::pipeline::{BackendKind, IndicatorParams, Pipeline};
use scanlab_core::scoring::Classification;
use scanlab_core::sizers::{Account, AtrRiskSizer, PositionSizer};

// ── Strategies (proptest) ────────────────────────────────────────────

fn bars_from(steps: &[(f64, f64, u64)]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let mut close = 100.0_f64;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(ret, spread, volume))| {
            let open = close;
            close = (close * (1.0 + ret)).max(1.0);
            Bar {
                symbol: "PROP".into(),
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) * (1.0 + spread),
                low: open.min(close) * (1.0 - spread),
                close,
                volume,
            }
        })
        .collect()
}

fn arb_bars(min: usize, max: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(
        (-0.05..0.05_f64, 0.0..0.03_f64, 1_000u64..5_000_000),
        min..max,
    )
    .prop_map(|steps| bars_from(&steps))
}

fn close_enough(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    (a - b).abs() <= 1e-7 * a.abs().max(1.0)
}

// ── 1. Alignment ─────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_series_matches_bar_count(bars in arb_bars(50, 160)) {
        let pipeline = Pipeline::new(&IndicatorParams::default(), BackendKind::Optimized).unwrap();
        let series = pipeline.run(&bars).unwrap();
        prop_assert_eq!(series.bar_count(), bars.len());
        for name in series.names() {
            prop_assert_eq!(series.get_series(name).unwrap().len(), bars.len());
        }
    }

    // ── 2. RSI bounds ────────────────────────────────────────────────

    #[test]
    fn rsi_is_bounded(closes in prop::collection::vec(1.0..500.0_f64, 15..120)) {
        for v in rsi::rsi(&closes, 14).into_iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(&v), "rsi {}", v);
        }
    }

    // ── 3. Backend equivalence ───────────────────────────────────────

    #[test]
    fn backends_agree(bars in arb_bars(50, 140)) {
        let params = IndicatorParams::default();
        let reference = Pipeline::new(&params, BackendKind::Reference).unwrap().run(&bars).unwrap();
        let optimized = Pipeline::new(&params, BackendKind::Optimized).unwrap().run(&bars).unwrap();

        let names: Vec<&str> = reference.names().collect();
        prop_assert_eq!(&names, &optimized.names().collect::<Vec<_>>());
        for name in names {
            let a = reference.get_series(name).unwrap();
            let b = optimized.get_series(name).unwrap();
            for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
                prop_assert!(close_enough(x, y), "{}[{}]: {} vs {}", name, i, x, y);
            }
        }
    }

    // ── 4. Idempotence ───────────────────────────────────────────────

    #[test]
    fn repeated_runs_are_identical(bars in arb_bars(50, 120)) {
        for kind in [BackendKind::Reference, BackendKind::Optimized] {
            let pipeline = Pipeline::new(&IndicatorParams::default(), kind).unwrap();
            let first = pipeline.run(&bars).unwrap();
            let second = pipeline.run(&bars).unwrap();
            prop_assert_eq!(first.digest(), second.digest());
        }
    }

    // ── 5. Classification monotonicity ───────────────────────────────

    #[test]
    fn classification_is_monotonic(a in -30i32..30, b in -30i32..30) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Classification::from_score(lo) <= Classification::from_score(hi));
    }

    // ── 6. Sizing ────────────────────────────────────────────────────

    #[test]
    fn plan_respects_risk_budget(
        size in 1_000.0..1_000_000.0_f64,
        fraction in 0.001..0.1_f64,
        entry in 1.0..1_000.0_f64,
        atr in 0.01..50.0_f64,
        short in any::<bool>(),
    ) {
        let account = Account::new(size, fraction).unwrap();
        let action = if short { SignalType::Short } else { SignalType::Buy };
        if let Ok(plan) = AtrRiskSizer::default().plan(&account, action, entry, atr) {
            let stop_distance = (plan.entry - plan.stop_loss).abs();
            prop_assert!(plan.shares >= 1);
            prop_assert!(plan.shares as f64 * stop_distance <= plan.risk_amount * (1.0 + 1e-9));
            match action {
                SignalType::Buy => prop_assert!(plan.stop_loss < entry && plan.take_profit > entry),
                SignalType::Short => prop_assert!(plan.stop_loss > entry && plan.take_profit < entry),
            }
        }
    }
}

// ── Deterministic edge cases ─────────────────────────────────────────

#[test]
fn ema_converges_on_constant_series() {
    let values = vec![42.5; 60];
    let out = ema::ema(&values, 20);
    for v in &out[20..] {
        assert!((v - 42.5).abs() < 1e-9);
    }
}

#[test]
fn rsi_of_rising_series_is_100() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let out = rsi::rsi(&closes, 14);
    assert_eq!(out[39], 100.0);
    assert_eq!(out[14], 100.0);
}
