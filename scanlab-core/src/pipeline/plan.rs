//! Indicator requests and the dependency-ordered plan that runs them.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::names;
use crate::indicators::ichimoku::IchimokuParams;
use crate::indicators::macd::MacdParams;
use crate::indicators::parabolic_sar::SarParams;

// ─── Requests ───

/// One indicator computation and its parameters.
///
/// Kinds that read another indicator's output name that output explicitly
/// (`atr` for Keltner and SuperTrend); everything else reads bars only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorKind {
    Ema { span: usize },
    Rsi { period: usize },
    Stochastic { k_period: usize, d_period: usize },
    WilliamsR { period: usize },
    Mfi { period: usize },
    Bollinger { period: usize, k: f64 },
    Atr { period: usize },
    Keltner { span: usize, k: f64, atr: String },
    Donchian { period: usize },
    Macd { params: MacdParams },
    Adx { period: usize },
    ParabolicSar { params: SarParams },
    Obv,
    Vwap,
    Vwma { period: usize },
    Cmf { period: usize },
    VolumeRatio { period: usize },
    SuperTrend { multiplier: f64, atr: String },
    Ichimoku { params: IchimokuParams },
    Pivots,
    Range { period: usize },
}

const SINGLE: &[&str] = &[""];
const BANDS: &[&str] = &["upper", "middle", "lower"];

impl IndicatorKind {
    /// Output suffixes in the order `compute` returns them. An empty suffix is
    /// the request's own name.
    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            IndicatorKind::Stochastic { .. } => &["k", "d"],
            IndicatorKind::Bollinger { .. }
            | IndicatorKind::Keltner { .. }
            | IndicatorKind::Donchian { .. } => BANDS,
            IndicatorKind::Macd { .. } => &["", "signal", "histogram"],
            IndicatorKind::Adx { .. } => &["", "plus_di", "minus_di"],
            IndicatorKind::VolumeRatio { .. } => &["avg", "ratio"],
            IndicatorKind::SuperTrend { .. } => &["", "direction", "upper", "lower"],
            IndicatorKind::Ichimoku { .. } => &["tenkan", "kijun", "senkou_a", "senkou_b", "chikou"],
            IndicatorKind::Pivots => &["", "r1", "s1", "r2", "s2"],
            IndicatorKind::Range { .. } => &["high", "low"],
            _ => SINGLE,
        }
    }

    /// Series this kind reads from earlier requests.
    pub fn dependencies(&self) -> Vec<&str> {
        match self {
            IndicatorKind::Keltner { atr, .. } | IndicatorKind::SuperTrend { atr, .. } => {
                vec![atr.as_str()]
            }
            _ => Vec::new(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let positive = |label: &str, v: usize| {
            if v == 0 {
                Err(format!("{label} must be >= 1"))
            } else {
                Ok(())
            }
        };
        let finite = |label: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(format!("{label} must be a positive number, got {v}"))
            }
        };

        match self {
            IndicatorKind::Ema { span } => positive("span", *span),
            IndicatorKind::Rsi { period }
            | IndicatorKind::WilliamsR { period }
            | IndicatorKind::Mfi { period }
            | IndicatorKind::Atr { period }
            | IndicatorKind::Donchian { period }
            | IndicatorKind::Adx { period }
            | IndicatorKind::Vwma { period }
            | IndicatorKind::Cmf { period }
            | IndicatorKind::VolumeRatio { period }
            | IndicatorKind::Range { period } => positive("period", *period),
            IndicatorKind::Stochastic { k_period, d_period } => {
                positive("k_period", *k_period)?;
                positive("d_period", *d_period)
            }
            IndicatorKind::Bollinger { period, k } => {
                positive("period", *period)?;
                finite("k", *k)
            }
            IndicatorKind::Keltner { span, k, .. } => {
                positive("span", *span)?;
                finite("k", *k)
            }
            IndicatorKind::Macd { params } => {
                positive("fast", params.fast)?;
                positive("slow", params.slow)?;
                positive("signal", params.signal)
            }
            IndicatorKind::ParabolicSar { params } => {
                finite("af_start", params.af_start)?;
                finite("af_step", params.af_step)?;
                if params.af_max < params.af_start {
                    return Err("af_max must be >= af_start".into());
                }
                Ok(())
            }
            IndicatorKind::SuperTrend { multiplier, .. } => finite("multiplier", *multiplier),
            IndicatorKind::Ichimoku { params } => {
                positive("tenkan", params.tenkan)?;
                positive("kijun", params.kijun)?;
                positive("senkou_b", params.senkou_b)
            }
            IndicatorKind::Obv | IndicatorKind::Vwap | IndicatorKind::Pivots => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRequest {
    pub name: String,
    pub kind: IndicatorKind,
}

impl IndicatorRequest {
    pub fn new(name: impl Into<String>, kind: IndicatorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Full output names, aligned with the kind's output order.
    pub fn output_names(&self) -> Vec<String> {
        self.kind
            .outputs()
            .iter()
            .map(|suffix| {
                if suffix.is_empty() {
                    self.name.clone()
                } else {
                    format!("{}_{suffix}", self.name)
                }
            })
            .collect()
    }
}

// ─── Parameters ───

/// Parameters of the standard plan. Defaults follow common charting conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_medium: usize,
    pub ema_long: usize,
    pub rsi_period: usize,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub williams_period: usize,
    pub mfi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub atr_period: usize,
    pub keltner_span: usize,
    pub keltner_k: f64,
    pub donchian_period: usize,
    pub macd: MacdParams,
    pub macd_fast: MacdParams,
    pub adx_period: usize,
    pub psar: SarParams,
    pub vwma_period: usize,
    pub cmf_period: usize,
    pub volume_period: usize,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
    pub ichimoku: IchimokuParams,
    pub short_range: usize,
    pub long_range: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 12,
            ema_slow: 26,
            ema_medium: 50,
            ema_long: 200,
            rsi_period: 14,
            stoch_k: 14,
            stoch_d: 3,
            williams_period: 14,
            mfi_period: 14,
            bollinger_period: 20,
            bollinger_k: 2.0,
            atr_period: 14,
            keltner_span: 20,
            keltner_k: 2.0,
            donchian_period: 20,
            macd: MacdParams::STANDARD,
            macd_fast: MacdParams::FAST,
            adx_period: 14,
            psar: SarParams::default(),
            vwma_period: 20,
            cmf_period: 20,
            volume_period: 20,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
            ichimoku: IchimokuParams::default(),
            short_range: 20,
            long_range: 252,
        }
    }
}

impl IndicatorParams {
    /// Requests of the standard plan, grouped in dependency order:
    /// moving averages, oscillators, volatility bands, trend/momentum,
    /// volume, stateful recurrences, support/resistance.
    pub fn requests(&self) -> Vec<IndicatorRequest> {
        use IndicatorKind as K;
        let req = |name: &str, kind| IndicatorRequest::new(name, kind);
        vec![
            req(names::EMA_FAST, K::Ema { span: self.ema_fast }),
            req(names::EMA_SLOW, K::Ema { span: self.ema_slow }),
            req(names::EMA_MEDIUM, K::Ema { span: self.ema_medium }),
            req(names::EMA_LONG, K::Ema { span: self.ema_long }),
            req(names::RSI, K::Rsi { period: self.rsi_period }),
            req(
                names::STOCH,
                K::Stochastic {
                    k_period: self.stoch_k,
                    d_period: self.stoch_d,
                },
            ),
            req(names::WILLIAMS_R, K::WilliamsR { period: self.williams_period }),
            req(names::MFI, K::Mfi { period: self.mfi_period }),
            req(
                names::BB,
                K::Bollinger {
                    period: self.bollinger_period,
                    k: self.bollinger_k,
                },
            ),
            req(names::ATR, K::Atr { period: self.atr_period }),
            req(names::SUPERTREND_ATR, K::Atr { period: self.supertrend_period }),
            req(names::DC, K::Donchian { period: self.donchian_period }),
            req(
                names::KC,
                K::Keltner {
                    span: self.keltner_span,
                    k: self.keltner_k,
                    atr: names::ATR.to_string(),
                },
            ),
            req(names::MACD, K::Macd { params: self.macd }),
            req(names::MACD_FAST, K::Macd { params: self.macd_fast }),
            req(names::ADX, K::Adx { period: self.adx_period }),
            req(names::PSAR, K::ParabolicSar { params: self.psar }),
            req(names::OBV, K::Obv),
            req(names::VWAP, K::Vwap),
            req(names::VWMA, K::Vwma { period: self.vwma_period }),
            req(names::CMF, K::Cmf { period: self.cmf_period }),
            req(names::VOLUME, K::VolumeRatio { period: self.volume_period }),
            req(
                names::SUPERTREND,
                K::SuperTrend {
                    multiplier: self.supertrend_multiplier,
                    atr: names::SUPERTREND_ATR.to_string(),
                },
            ),
            req(names::ICHIMOKU, K::Ichimoku { params: self.ichimoku }),
            req(names::PIVOT, K::Pivots),
            req(names::RANGE_SHORT, K::Range { period: self.short_range }),
            req(names::RANGE_LONG, K::Range { period: self.long_range }),
        ]
    }
}

// ─── Plan ───

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("indicator '{indicator}' reads '{requires}', which no earlier indicator produces")]
    MissingDependency { indicator: String, requires: String },

    #[error("output '{name}' is produced twice")]
    DuplicateOutput { name: String },

    #[error("indicator '{indicator}': {reason}")]
    InvalidParameter { indicator: String, reason: String },
}

/// Validated requests grouped into stages. Every request in stage `k` depends
/// only on outputs of stages `< k`, so requests inside a stage are independent.
#[derive(Debug, Clone)]
pub struct IndicatorPlan {
    requests: Vec<IndicatorRequest>,
    stages: Vec<Vec<usize>>,
}

impl IndicatorPlan {
    pub fn new(requests: Vec<IndicatorRequest>) -> Result<Self, PlanError> {
        // output name → stage of the request producing it
        let mut produced: HashMap<String, usize> = HashMap::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stage_of = Vec::with_capacity(requests.len());

        for request in &requests {
            request
                .kind
                .validate()
                .map_err(|reason| PlanError::InvalidParameter {
                    indicator: request.name.clone(),
                    reason,
                })?;

            let mut stage = 0;
            for dep in request.kind.dependencies() {
                let dep_stage = produced.get(dep).ok_or_else(|| PlanError::MissingDependency {
                    indicator: request.name.clone(),
                    requires: dep.to_string(),
                })?;
                stage = stage.max(dep_stage + 1);
            }

            for output in request.output_names() {
                if !seen.insert(output.clone()) {
                    return Err(PlanError::DuplicateOutput { name: output });
                }
                produced.insert(output, stage);
            }
            stage_of.push(stage);
        }

        let depth = stage_of.iter().max().map_or(0, |s| s + 1);
        let mut stages = vec![Vec::new(); depth];
        for (idx, stage) in stage_of.into_iter().enumerate() {
            stages[stage].push(idx);
        }

        Ok(Self { requests, stages })
    }

    pub fn standard(params: &IndicatorParams) -> Result<Self, PlanError> {
        Self::new(params.requests())
    }

    /// Requests in declared order.
    pub fn requests(&self) -> &[IndicatorRequest] {
        &self.requests
    }

    /// Stages in execution order, each listing its requests in declared order.
    pub fn stages(&self) -> impl Iterator<Item = Vec<&IndicatorRequest>> + '_ {
        self.stages
            .iter()
            .map(|stage| stage.iter().map(|&i| &self.requests[i]).collect())
    }

    /// Every output name the plan produces.
    pub fn output_names(&self) -> Vec<String> {
        self.requests
            .iter()
            .flat_map(IndicatorRequest::output_names)
            .collect()
    }
}
