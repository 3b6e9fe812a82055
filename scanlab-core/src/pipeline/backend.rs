//! Interchangeable indicator backends.
//!
//! A backend turns one `IndicatorRequest` into its output series. The
//! reference backend recomputes every rolling window and evaluates requests
//! one at a time; the optimized backend uses incremental window kernels and
//! evaluates the independent requests of a stage in parallel. Recurrences are
//! folded sequentially over time by both.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::plan::{IndicatorKind, IndicatorRequest};
use super::series::IndicatorSeries;
use super::PipelineError;
use crate::domain::Bar;
use crate::indicators::{
    adx, atr, bollinger, donchian, ema, ichimoku, keltner, levels, macd, mfi, parabolic_sar, rsi,
    stochastic, supertrend, volume, NaiveWindows, StreamingWindows, WindowOps,
};

/// Column view of a bar sequence, extracted once per pipeline run.
#[derive(Debug, Clone)]
pub struct BarColumns {
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl BarColumns {
    pub fn from_bars(bars: &[Bar]) -> Self {
        Self {
            highs: crate::indicators::highs(bars),
            lows: crate::indicators::lows(bars),
            closes: crate::indicators::closes(bars),
            volumes: crate::indicators::volumes(bars),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

pub type NamedSeries = (String, Vec<f64>);

pub trait IndicatorBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Compute one request. `computed` holds the outputs of earlier stages.
    fn compute(
        &self,
        request: &IndicatorRequest,
        input: &BarColumns,
        computed: &IndicatorSeries,
    ) -> Result<Vec<NamedSeries>, PipelineError>;

    /// Compute a stage of mutually independent requests, outputs in request order.
    fn compute_stage(
        &self,
        stage: &[&IndicatorRequest],
        input: &BarColumns,
        computed: &IndicatorSeries,
    ) -> Result<Vec<NamedSeries>, PipelineError> {
        let mut out = Vec::new();
        for request in stage {
            out.extend(self.compute(request, input, computed)?);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Reference,
    #[default]
    Optimized,
}

impl BackendKind {
    pub fn build(self) -> Box<dyn IndicatorBackend> {
        match self {
            BackendKind::Reference => Box::new(ReferenceBackend),
            BackendKind::Optimized => Box::new(OptimizedBackend),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl IndicatorBackend for ReferenceBackend {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn compute(
        &self,
        request: &IndicatorRequest,
        input: &BarColumns,
        computed: &IndicatorSeries,
    ) -> Result<Vec<NamedSeries>, PipelineError> {
        evaluate(request, input, computed, &NaiveWindows)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizedBackend;

impl IndicatorBackend for OptimizedBackend {
    fn name(&self) -> &'static str {
        "optimized"
    }

    fn compute(
        &self,
        request: &IndicatorRequest,
        input: &BarColumns,
        computed: &IndicatorSeries,
    ) -> Result<Vec<NamedSeries>, PipelineError> {
        evaluate(request, input, computed, &StreamingWindows)
    }

    fn compute_stage(
        &self,
        stage: &[&IndicatorRequest],
        input: &BarColumns,
        computed: &IndicatorSeries,
    ) -> Result<Vec<NamedSeries>, PipelineError> {
        let per_request: Vec<Vec<NamedSeries>> = stage
            .par_iter()
            .map(|request| self.compute(request, input, computed))
            .collect::<Result<_, _>>()?;
        Ok(per_request.into_iter().flatten().collect())
    }
}

fn dependency<'a>(
    computed: &'a IndicatorSeries,
    request: &IndicatorRequest,
    series: &str,
) -> Result<&'a [f64], PipelineError> {
    computed
        .get_series(series)
        .ok_or_else(|| PipelineError::MissingSeries {
            indicator: request.name.clone(),
            series: series.to_string(),
        })
}

/// Dispatch one request to its indicator function.
fn evaluate(
    request: &IndicatorRequest,
    input: &BarColumns,
    computed: &IndicatorSeries,
    w: &dyn WindowOps,
) -> Result<Vec<NamedSeries>, PipelineError> {
    let BarColumns {
        highs,
        lows,
        closes,
        volumes,
    } = input;

    let outputs: Vec<Vec<f64>> = match &request.kind {
        IndicatorKind::Ema { span } => vec![ema::ema(closes, *span)],
        IndicatorKind::Rsi { period } => vec![rsi::rsi(closes, *period)],
        IndicatorKind::Stochastic { k_period, d_period } => {
            let s = stochastic::stochastic(highs, lows, closes, *k_period, *d_period, w);
            vec![s.k, s.d]
        }
        IndicatorKind::WilliamsR { period } => {
            vec![stochastic::williams_r(highs, lows, closes, *period, w)]
        }
        IndicatorKind::Mfi { period } => vec![mfi::mfi(highs, lows, closes, volumes, *period, w)],
        IndicatorKind::Bollinger { period, k } => {
            let b = bollinger::bollinger(closes, *period, *k, w);
            vec![b.upper, b.middle, b.lower]
        }
        IndicatorKind::Atr { period } => vec![atr::atr(highs, lows, closes, *period, w)],
        IndicatorKind::Keltner { span, k, atr } => {
            let atr = dependency(computed, request, atr)?;
            let b = keltner::keltner(closes, atr, *span, *k);
            vec![b.upper, b.middle, b.lower]
        }
        IndicatorKind::Donchian { period } => {
            let b = donchian::donchian(highs, lows, *period, w);
            vec![b.upper, b.middle, b.lower]
        }
        IndicatorKind::Macd { params } => {
            let m = macd::macd(closes, params.fast, params.slow, params.signal);
            vec![m.line, m.signal, m.histogram]
        }
        IndicatorKind::Adx { period } => {
            let d = adx::adx(highs, lows, closes, *period);
            vec![d.adx, d.plus_di, d.minus_di]
        }
        IndicatorKind::ParabolicSar { params } => {
            vec![parabolic_sar::parabolic_sar(highs, lows, closes, *params)]
        }
        IndicatorKind::Obv => vec![volume::obv(closes, volumes)],
        IndicatorKind::Vwap => vec![volume::vwap(highs, lows, closes, volumes)],
        IndicatorKind::Vwma { period } => vec![volume::vwma(closes, volumes, *period, w)],
        IndicatorKind::Cmf { period } => {
            vec![volume::cmf(highs, lows, closes, volumes, *period, w)]
        }
        IndicatorKind::VolumeRatio { period } => {
            let v = volume::volume_ratio(volumes, *period, w);
            vec![v.average, v.ratio]
        }
        IndicatorKind::SuperTrend { multiplier, atr } => {
            let atr = dependency(computed, request, atr)?;
            let st = supertrend::supertrend(highs, lows, closes, atr, *multiplier);
            vec![st.value, st.direction, st.upper, st.lower]
        }
        IndicatorKind::Ichimoku { params } => {
            let ich = ichimoku::ichimoku(highs, lows, closes, *params, w);
            vec![ich.tenkan, ich.kijun, ich.senkou_a, ich.senkou_b, ich.chikou]
        }
        IndicatorKind::Pivots => {
            let p = levels::pivots(highs, lows, closes);
            vec![p.pivot, p.r1, p.s1, p.r2, p.s2]
        }
        IndicatorKind::Range { period } => {
            let r = levels::range_extremes(highs, lows, *period, w);
            vec![r.high, r.low]
        }
    };

    debug_assert_eq!(outputs.len(), request.kind.outputs().len());
    Ok(request.output_names().into_iter().zip(outputs).collect())
}
