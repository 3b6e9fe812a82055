//! Fundamental context: insider activity, headline sentiment, analyst consensus.
//!
//! Each source is optional. A missing source contributes nothing to the
//! adjustment; an empty one reads as neutral.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const HEADLINES_CONSIDERED: usize = 3;
const POSITIVE_WORDS: [&str; 5] = ["beat", "exceed", "strong", "growth", "profit"];
const NEGATIVE_WORDS: [&str; 5] = ["miss", "decline", "loss", "weak", "concern"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InsiderAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderTrade {
    #[serde(default)]
    pub name: String,
    pub action: InsiderAction,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub headline: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl Headline {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            source: None,
        }
    }
}

/// Analyst recommendation counts for the latest period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalystRatings {
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl AnalystRatings {
    pub fn total(&self) -> u64 {
        [self.strong_buy, self.buy, self.hold, self.sell, self.strong_sell]
            .iter()
            .map(|&n| u64::from(n))
            .sum()
    }

    /// Weighted mean, strong buy = 5 down to strong sell = 1. None without ratings.
    pub fn consensus(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let weighted = 5 * u64::from(self.strong_buy)
            + 4 * u64::from(self.buy)
            + 3 * u64::from(self.hold)
            + 2 * u64::from(self.sell)
            + u64::from(self.strong_sell);
        Some(weighted as f64 / total as f64)
    }
}

/// Everything an external context collaborator may know about a symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalContext {
    pub insider_trades: Option<Vec<InsiderTrade>>,
    pub headlines: Option<Vec<Headline>>,
    pub analyst: Option<AnalystRatings>,
}

impl FundamentalContext {
    pub fn is_empty(&self) -> bool {
        self.insider_trades.is_none() && self.headlines.is_none() && self.analyst.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InsiderSignal {
    Bullish,
    Neutral,
    Bearish,
}

impl InsiderSignal {
    pub fn from_trades(trades: &[InsiderTrade]) -> Self {
        let buys = trades
            .iter()
            .filter(|t| t.action == InsiderAction::Buy)
            .count();
        let sells = trades.len() - buys;
        if buys >= 2 {
            Self::Bullish
        } else if sells >= 2 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    pub fn points(self) -> i32 {
        match self {
            Self::Bullish => 1,
            Self::Neutral => 0,
            Self::Bearish => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewsSentiment {
    Positive,
    Neutral,
    Negative,
}

impl NewsSentiment {
    /// One vote per recent headline: positive if any positive keyword
    /// appears, otherwise negative if any negative keyword does.
    pub fn from_headlines(headlines: &[Headline]) -> Self {
        let (mut positive, mut negative) = (0usize, 0usize);
        for h in headlines.iter().take(HEADLINES_CONSIDERED) {
            let text = h.headline.to_lowercase();
            if POSITIVE_WORDS.iter().any(|w| text.contains(w)) {
                positive += 1;
            } else if NEGATIVE_WORDS.iter().any(|w| text.contains(w)) {
                negative += 1;
            }
        }
        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Self::Positive,
            std::cmp::Ordering::Less => Self::Negative,
            std::cmp::Ordering::Equal => Self::Neutral,
        }
    }

    pub fn points(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Neutral => 0,
            Self::Negative => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalystRating {
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

impl AnalystRating {
    pub fn from_ratings(ratings: &AnalystRatings) -> Self {
        match ratings.consensus() {
            Some(c) if c >= 4.5 => Self::StrongBuy,
            Some(c) if c >= 3.5 => Self::Buy,
            Some(c) if c <= 2.5 => Self::Sell,
            _ => Self::Hold,
        }
    }

    pub fn points(self) -> i32 {
        match self {
            Self::StrongBuy | Self::Buy => 1,
            Self::Hold => 0,
            Self::Sell => -1,
        }
    }
}

/// Derived fundamental verdicts and their combined score adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundamentalView {
    pub insider: Option<InsiderSignal>,
    pub news: Option<NewsSentiment>,
    pub analyst: Option<AnalystRating>,
}

impl FundamentalView {
    pub fn from_context(ctx: &FundamentalContext) -> Self {
        Self {
            insider: ctx.insider_trades.as_deref().map(InsiderSignal::from_trades),
            news: ctx.headlines.as_deref().map(NewsSentiment::from_headlines),
            analyst: ctx.analyst.as_ref().map(AnalystRating::from_ratings),
        }
    }

    pub fn adjustment(&self) -> i32 {
        self.insider.map_or(0, InsiderSignal::points)
            + self.news.map_or(0, NewsSentiment::points)
            + self.analyst.map_or(0, AnalystRating::points)
    }
}
