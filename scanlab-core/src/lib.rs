//! ScanLab Core: indicators, scoring, signals and position sizing for one symbol.
//!
//! This crate contains the per-symbol engine:
//! - Domain types (bars, signals)
//! - Indicator functions and the staged indicator pipeline with two backends
//! - Signal detector over the latest bars
//! - Composite scorer with optional fundamental adjustment
//! - ATR risk position sizer
//! - `Analyzer`, which runs all of the above once per bar history

pub mod analysis;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod scoring;
pub mod signals;
pub mod sizers;

pub use analysis::{Analyzer, ScoredSnapshot};
pub use pipeline::{BackendKind, IndicatorParams, IndicatorSeries, Pipeline, PipelineError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the scanner moves across tasks is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();

        require_send::<pipeline::IndicatorSeries>();
        require_sync::<pipeline::IndicatorSeries>();
        require_send::<pipeline::IndicatorPlan>();
        require_sync::<pipeline::IndicatorPlan>();
        require_send::<pipeline::Pipeline>();
        require_sync::<pipeline::Pipeline>();

        require_send::<scoring::CompositeScore>();
        require_sync::<scoring::CompositeScore>();
        require_send::<scoring::FundamentalContext>();
        require_sync::<scoring::FundamentalContext>();

        require_send::<sizers::PositionPlan>();
        require_sync::<sizers::PositionPlan>();

        require_send::<analysis::Analyzer>();
        require_sync::<analysis::Analyzer>();
        require_send::<analysis::ScoredSnapshot>();
        require_sync::<analysis::ScoredSnapshot>();
    }

    /// Architecture contract: the sizer never sees indicator series or bars,
    /// only the account, direction, entry and ATR.
    #[test]
    fn sizer_trait_takes_only_scalars() {
        fn _check_trait_object_builds(
            sizer: &dyn sizers::PositionSizer,
            account: &sizers::Account,
        ) -> Result<sizers::PositionPlan, sizers::SizingError> {
            sizer.plan(account, domain::SignalType::Buy, 1.0, 1.0)
        }
    }
}
