//! Criterion benchmarks for the per-symbol hot paths.
//!
//! Benchmarks:
//! 1. Full indicator pipeline, reference vs optimized backend
//! 2. Rolling window kernels in isolation
//! 3. Analyzer (pipeline + scoring + detection + sizing)

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use scanlab_core::domain::Bar;
use scanlab_core::indicators::{closes, NaiveWindows, StreamingWindows, WindowOps};
use scanlab_core::sizers::Account;
use scanlab_core::{Analyzer, BackendKind, IndicatorParams, Pipeline};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            Bar {
                symbol: "BENCH".into(),
                timestamp: base + Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

// ── 1. Pipeline ──────────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_pipeline");
    let params = IndicatorParams::default();

    for bar_count in [252, 1260, 5040] {
        let bars = make_bars(bar_count);
        for kind in [BackendKind::Reference, BackendKind::Optimized] {
            let pipeline = Pipeline::new(&params, kind).unwrap();
            group.bench_with_input(
                BenchmarkId::new(pipeline.backend_name(), bar_count),
                &bars,
                |b, bars| b.iter(|| pipeline.run(black_box(bars)).unwrap()),
            );
        }
    }
    group.finish();
}

// ── 2. Window kernels ────────────────────────────────────────────────

fn bench_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_std_20");
    let values = closes(&make_bars(5040));
    let kernels: [(&str, &dyn WindowOps); 2] =
        [("naive", &NaiveWindows), ("streaming", &StreamingWindows)];

    for (name, w) in kernels {
        group.bench_function(name, |b| b.iter(|| w.rolling_std(black_box(&values), 20)));
    }
    group.finish();
}

// ── 3. Analyzer ──────────────────────────────────────────────────────

fn bench_analyzer(c: &mut Criterion) {
    let bars = make_bars(252);
    let pipeline = Pipeline::new(&IndicatorParams::default(), BackendKind::Optimized).unwrap();
    let analyzer = Analyzer::new(pipeline, Account::default());

    c.bench_function("analyze_252_bars", |b| {
        b.iter(|| analyzer.analyze("BENCH", black_box(&bars), None).unwrap())
    });
}

criterion_group!(benches, bench_pipeline, bench_windows, bench_analyzer);
criterion_main!(benches);
