//! Composite scoring: latest indicator values reduced to one integer score.
//!
//! Every predicate in the weight table is evaluated on the most recent bar.
//! A predicate whose inputs are not all defined is excluded and recorded,
//! never counted as false.

pub mod fundamentals;

pub use fundamentals::{
    AnalystRating, AnalystRatings, FundamentalContext, FundamentalView, Headline, InsiderAction,
    InsiderSignal, InsiderTrade, NewsSentiment,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::pipeline::{names, IndicatorSeries};

/// Pseudo-series name for the latest close, which is not an indicator.
pub const CLOSE: &str = "close";

/// Score bands, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    StrongSell,
    Sell,
    WeakSell,
    Neutral,
    WeakBuy,
    Buy,
    StrongBuy,
}

impl Classification {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 8 => Self::StrongBuy,
            5..=7 => Self::Buy,
            2..=4 => Self::WeakBuy,
            -1..=1 => Self::Neutral,
            -4..=-2 => Self::WeakSell,
            -7..=-5 => Self::Sell,
            _ => Self::StrongSell,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::WeakBuy => "WEAK_BUY",
            Self::Neutral => "NEUTRAL",
            Self::WeakSell => "WEAK_SELL",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    RsiOversold,
    RsiOverbought,
    MacdAboveSignal,
    FastAboveSlow,
    CloseAboveMedium,
    CloseAboveLong,
    VolumeSurge,
    VolumeDryUp,
    StrongTrend,
    PositiveDirection,
    StochasticOversold,
    StochasticOverbought,
    Confluence,
    LongTrendBias,
}

impl Predicate {
    pub const ALL: [Predicate; 14] = [
        Predicate::RsiOversold,
        Predicate::RsiOverbought,
        Predicate::MacdAboveSignal,
        Predicate::FastAboveSlow,
        Predicate::CloseAboveMedium,
        Predicate::CloseAboveLong,
        Predicate::VolumeSurge,
        Predicate::VolumeDryUp,
        Predicate::StrongTrend,
        Predicate::PositiveDirection,
        Predicate::StochasticOversold,
        Predicate::StochasticOverbought,
        Predicate::Confluence,
        Predicate::LongTrendBias,
    ];

    /// Series the predicate reads on the latest bar.
    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            Self::RsiOversold | Self::RsiOverbought => &[names::RSI],
            Self::MacdAboveSignal => &[names::MACD, names::MACD_SIGNAL],
            Self::FastAboveSlow => &[names::EMA_FAST, names::EMA_SLOW],
            Self::CloseAboveMedium => &[CLOSE, names::EMA_MEDIUM],
            Self::CloseAboveLong | Self::LongTrendBias => &[CLOSE, names::EMA_LONG],
            Self::VolumeSurge | Self::VolumeDryUp => &[names::VOLUME_RATIO],
            Self::StrongTrend => &[names::ADX],
            Self::PositiveDirection => &[names::PLUS_DI, names::MINUS_DI],
            Self::StochasticOversold | Self::StochasticOverbought => &[names::STOCH_K],
            Self::Confluence => &[
                names::RSI,
                names::MACD,
                names::MACD_SIGNAL,
                names::MACD_HISTOGRAM,
                names::EMA_FAST,
                names::EMA_SLOW,
            ],
        }
    }

    /// Points awarded given defined inputs, in `inputs()` order.
    fn points(self, v: &[f64]) -> i32 {
        let when = |cond: bool, weight: i32| if cond { weight } else { 0 };
        match self {
            Self::RsiOversold => when(v[0] < 30.0, 2),
            Self::RsiOverbought => when(v[0] > 70.0, -2),
            Self::MacdAboveSignal => when(v[0] > v[1], 1),
            Self::FastAboveSlow => when(v[0] > v[1], 1),
            Self::CloseAboveMedium => when(v[0] > v[1], 1),
            Self::CloseAboveLong => when(v[0] > v[1], 1),
            Self::VolumeSurge => when(v[0] > 2.0, 2),
            Self::VolumeDryUp => when(v[0] < 0.5, -1),
            Self::StrongTrend => when(v[0] > 25.0, 1),
            Self::PositiveDirection => when(v[0] > v[1], 1),
            Self::StochasticOversold => when(v[0] < 20.0, 1),
            Self::StochasticOverbought => when(v[0] > 80.0, -1),
            Self::Confluence => when(
                v[0] < 40.0 && v[1] > v[2] && v[3] > 0.0 && v[4] > v[5],
                2,
            ),
            Self::LongTrendBias => match v[0].partial_cmp(&v[1]) {
                Some(std::cmp::Ordering::Greater) => 1,
                Some(std::cmp::Ordering::Less) => -1,
                _ => 0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub predicate: Predicate,
    pub points: i32,
}

/// A predicate left out of the sum because some inputs were undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPredicate {
    pub predicate: Predicate,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub technical_score: i32,
    pub classification: Classification,
    /// Every evaluated predicate, including those worth zero.
    pub contributions: Vec<Contribution>,
    pub excluded: Vec<ExcludedPredicate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeScorer;

impl CompositeScorer {
    pub fn score(&self, close: f64, series: &IndicatorSeries) -> CompositeScore {
        let lookup = |name: &str| -> Option<f64> {
            if name == CLOSE {
                Some(close).filter(|c| c.is_finite())
            } else {
                series.latest(name)
            }
        };

        let mut contributions = Vec::with_capacity(Predicate::ALL.len());
        let mut excluded = Vec::new();

        for predicate in Predicate::ALL {
            let inputs = predicate.inputs();
            let values: Vec<Option<f64>> = inputs.iter().map(|n| lookup(n)).collect();
            if values.iter().all(Option::is_some) {
                let defined: Vec<f64> = values.into_iter().flatten().collect();
                contributions.push(Contribution {
                    predicate,
                    points: predicate.points(&defined),
                });
            } else {
                let missing = inputs
                    .iter()
                    .zip(&values)
                    .filter(|(_, v)| v.is_none())
                    .map(|(n, _)| n.to_string())
                    .collect();
                excluded.push(ExcludedPredicate { predicate, missing });
            }
        }

        if !excluded.is_empty() {
            debug!(count = excluded.len(), "predicates excluded for undefined inputs");
        }

        let technical_score = contributions.iter().map(|c| c.points).sum();
        CompositeScore {
            technical_score,
            classification: Classification::from_score(technical_score),
            contributions,
            excluded,
        }
    }
}
