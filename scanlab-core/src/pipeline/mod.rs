//! Indicator pipeline: bars in, aligned indicator series out.
//!
//! The pipeline validates the bar sequence, then runs the plan stage by stage
//! through the backend chosen at construction. Output series always have the
//! same length as the input.

pub mod backend;
pub mod names;
pub mod plan;
pub mod series;

pub use backend::{
    BackendKind, BarColumns, IndicatorBackend, NamedSeries, OptimizedBackend, ReferenceBackend,
};
pub use plan::{IndicatorKind, IndicatorParams, IndicatorPlan, IndicatorRequest, PlanError};
pub use series::IndicatorSeries;

use thiserror::Error;

use crate::domain::{validate_bars, Bar, BarError};

/// Fewest bars the pipeline accepts.
pub const MIN_BARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("insufficient data: {actual} bars, need at least {required}")]
    DataInsufficient { required: usize, actual: usize },

    #[error("invalid bar sequence: {0}")]
    InvalidBars(#[from] BarError),

    #[error("invalid indicator plan: {0}")]
    Plan(#[from] PlanError),

    #[error("indicator '{indicator}' needs series '{series}', which has not been computed")]
    MissingSeries { indicator: String, series: String },

    #[error("series '{name}' has {actual} values for {expected} bars")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug)]
pub struct Pipeline {
    plan: IndicatorPlan,
    backend: Box<dyn IndicatorBackend>,
    min_bars: usize,
}

impl Pipeline {
    /// Standard plan from `params`, run on the backend `kind`.
    pub fn new(params: &IndicatorParams, kind: BackendKind) -> Result<Self, PipelineError> {
        Ok(Self::with_plan(IndicatorPlan::standard(params)?, kind.build()))
    }

    pub fn with_plan(plan: IndicatorPlan, backend: Box<dyn IndicatorBackend>) -> Self {
        Self {
            plan,
            backend,
            min_bars: MIN_BARS,
        }
    }

    /// Override the minimum accepted history (never below 1).
    pub fn with_min_bars(mut self, min_bars: usize) -> Self {
        self.min_bars = min_bars.max(1);
        self
    }

    pub fn plan(&self) -> &IndicatorPlan {
        &self.plan
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn min_bars(&self) -> usize {
        self.min_bars
    }

    pub fn run(&self, bars: &[Bar]) -> Result<IndicatorSeries, PipelineError> {
        if bars.len() < self.min_bars {
            return Err(PipelineError::DataInsufficient {
                required: self.min_bars,
                actual: bars.len(),
            });
        }
        validate_bars(bars)?;

        let input = BarColumns::from_bars(bars);
        let mut series = IndicatorSeries::new(bars.len());

        for stage in self.plan.stages() {
            let outputs = self.backend.compute_stage(&stage, &input, &series)?;
            for (name, values) in outputs {
                series.insert(name, values)?;
            }
        }

        Ok(series)
    }
}
