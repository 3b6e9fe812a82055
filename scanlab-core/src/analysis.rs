//! Per-symbol analysis: pipeline, scorer, detector and sizer run once over one bar history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{Bar, Signal, SignalType};
use crate::pipeline::{names, IndicatorSeries, Pipeline, PipelineError};
use crate::scoring::{
    Classification, CompositeScorer, Contribution, ExcludedPredicate, FundamentalContext,
    FundamentalView,
};
use crate::signals::SignalDetector;
use crate::sizers::{Account, AtrRiskSizer, PositionPlan, PositionSizer};

/// Aggregate result for one symbol at its latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSnapshot {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    pub price: f64,
    /// technical_score + fundamental_adjustment
    pub score: i32,
    pub technical_score: i32,
    pub fundamental_adjustment: i32,
    pub classification: Classification,
    pub contributions: Vec<Contribution>,
    pub excluded: Vec<ExcludedPredicate>,
    /// Latest defined value of every computed series.
    pub indicators: BTreeMap<String, f64>,
    pub signals: Vec<Signal>,
    pub plan: Option<PositionPlan>,
    /// Why `plan` is absent, when signals were present.
    pub sizing_note: Option<String>,
    pub fundamentals: Option<FundamentalView>,
}

impl ScoredSnapshot {
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied()
    }

    pub fn rsi(&self) -> Option<f64> {
        self.indicator(names::RSI)
    }

    pub fn volume_ratio(&self) -> Option<f64> {
        self.indicator(names::VOLUME_RATIO)
    }

    pub fn has_signal(&self, kind: SignalType) -> bool {
        self.signals.iter().any(|s| s.kind == kind)
    }
}

/// Trade direction for a set of signals: SHORT if any signal says so.
pub fn direction(signals: &[Signal]) -> Option<SignalType> {
    if signals.is_empty() {
        None
    } else if signals.iter().any(|s| s.kind == SignalType::Short) {
        Some(SignalType::Short)
    } else {
        Some(SignalType::Buy)
    }
}

pub struct Analyzer {
    pipeline: Pipeline,
    detector: SignalDetector,
    scorer: CompositeScorer,
    sizer: Box<dyn PositionSizer>,
    account: Account,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("pipeline", &self.pipeline)
            .field("detector", &self.detector)
            .field("sizer", &self.sizer.name())
            .field("account", &self.account)
            .finish()
    }
}

impl Analyzer {
    pub fn new(pipeline: Pipeline, account: Account) -> Self {
        Self {
            pipeline,
            detector: SignalDetector::default(),
            scorer: CompositeScorer,
            sizer: Box::new(AtrRiskSizer::default()),
            account,
        }
    }

    pub fn with_detector(mut self, detector: SignalDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_sizer(mut self, sizer: impl PositionSizer + 'static) -> Self {
        self.sizer = Box::new(sizer);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Indicators only, without scoring.
    pub fn indicators(&self, bars: &[Bar]) -> Result<IndicatorSeries, PipelineError> {
        self.pipeline.run(bars)
    }

    pub fn analyze(
        &self,
        symbol: &str,
        bars: &[Bar],
        context: Option<&FundamentalContext>,
    ) -> Result<ScoredSnapshot, PipelineError> {
        let series = self.pipeline.run(bars)?;
        // run() refuses empty input, so a last bar exists
        let Some(last) = bars.last() else {
            return Err(PipelineError::DataInsufficient {
                required: self.pipeline.min_bars(),
                actual: 0,
            });
        };

        let composite = self.scorer.score(last.close, &series);
        let fundamentals = context
            .filter(|c| !c.is_empty())
            .map(FundamentalView::from_context);
        let fundamental_adjustment = fundamentals.as_ref().map_or(0, FundamentalView::adjustment);
        let score = composite.technical_score + fundamental_adjustment;

        let signals = self.detector.detect(bars, &series);
        let (plan, sizing_note) = self.size(&signals, last.close, &series);

        let indicators = series
            .names()
            .filter_map(|n| series.latest(n).map(|v| (n.to_string(), v)))
            .collect();

        debug!(
            symbol,
            score,
            signals = signals.len(),
            sized = plan.is_some(),
            "analyzed"
        );

        Ok(ScoredSnapshot {
            symbol: symbol.to_string(),
            as_of: last.timestamp,
            price: last.close,
            score,
            technical_score: composite.technical_score,
            fundamental_adjustment,
            classification: Classification::from_score(score),
            contributions: composite.contributions,
            excluded: composite.excluded,
            indicators,
            signals,
            plan,
            sizing_note,
            fundamentals,
        })
    }

    fn size(
        &self,
        signals: &[Signal],
        entry: f64,
        series: &IndicatorSeries,
    ) -> (Option<PositionPlan>, Option<String>) {
        let Some(action) = direction(signals) else {
            return (None, None);
        };
        let Some(atr) = series.latest(names::ATR) else {
            return (None, Some("ATR undefined on the latest bar".to_string()));
        };
        match self.sizer.plan(&self.account, action, entry, atr) {
            Ok(plan) => (Some(plan), None),
            Err(e) => (None, Some(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalStrength;
    use crate::indicators::make_ohlcv_bars;
    use crate::pipeline::{BackendKind, IndicatorParams};

    fn analyzer() -> Analyzer {
        let pipeline = Pipeline::new(&IndicatorParams::default(), BackendKind::Reference).unwrap();
        Analyzer::new(pipeline, Account::default())
    }

    fn trending(n: usize) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let c = 50.0 + i as f64 * 0.5 + (i as f64 * 0.7).sin();
                (c - 0.2, c + 1.0, c - 1.0, c, 1_000_000 + (i as u64 % 7) * 10_000)
            })
            .collect();
        make_ohlcv_bars(&data)
    }

    #[test]
    fn direction_prefers_short() {
        let buy = Signal::new(SignalType::Buy, "golden cross", SignalStrength::Strong);
        let short = Signal::new(SignalType::Short, "MACD cross", SignalStrength::Medium);
        assert_eq!(direction(&[]), None);
        assert_eq!(direction(&[buy.clone()]), Some(SignalType::Buy));
        assert_eq!(direction(&[buy, short]), Some(SignalType::Short));
    }

    #[test]
    fn snapshot_reflects_latest_bar() {
        let bars = trending(260);
        let snap = analyzer().analyze("TEST", &bars, None).unwrap();
        let last = bars.last().unwrap();
        assert_eq!(snap.symbol, "TEST");
        assert_eq!(snap.as_of, last.timestamp);
        assert_eq!(snap.price, last.close);
        assert_eq!(snap.fundamental_adjustment, 0);
        assert_eq!(snap.score, snap.technical_score);
        assert_eq!(snap.classification, Classification::from_score(snap.score));
        assert!(snap.rsi().is_some());
        assert!(snap.indicators.values().all(|v| v.is_finite()));
        assert!(snap.fundamentals.is_none());
    }

    #[test]
    fn fundamentals_shift_the_score() {
        let bars = trending(120);
        let ctx = FundamentalContext {
            analyst: Some(crate::scoring::AnalystRatings {
                strong_buy: 9,
                buy: 1,
                ..Default::default()
            }),
            ..Default::default()
        };
        let a = analyzer();
        let plain = a.analyze("TEST", &bars, None).unwrap();
        let with = a.analyze("TEST", &bars, Some(&ctx)).unwrap();
        assert_eq!(with.fundamental_adjustment, 1);
        assert_eq!(with.score, plain.score + 1);
        assert_eq!(with.technical_score, plain.technical_score);
    }

    #[test]
    fn unsignalled_snapshot_has_no_plan_or_note() {
        // flat prices: no crosses, no reversals
        let bars = make_ohlcv_bars(&vec![(10.0, 10.5, 9.5, 10.0, 1_000); 80]);
        let snap = analyzer().analyze("FLAT", &bars, None).unwrap();
        assert!(snap.signals.is_empty());
        assert!(snap.plan.is_none());
        assert!(snap.sizing_note.is_none());
    }

    #[test]
    fn short_history_is_refused() {
        let bars = trending(30);
        assert!(matches!(
            analyzer().analyze("TEST", &bars, None),
            Err(PipelineError::DataInsufficient { actual: 30, .. })
        ));
    }
}
