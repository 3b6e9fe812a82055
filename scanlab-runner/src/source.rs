//! Source abstractions for bars and fundamental context.
//!
//! The scanner only sees these traits. Concrete sources (CSV files, synthetic
//! walks, a JSON context file) live in `data_loader`; network providers are
//! external collaborators that implement the same traits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use scanlab_core::domain::Bar;
use scanlab_core::scoring::FundamentalContext;

/// Errors a bar source may report for one symbol.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data returned for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: {actual} bars, need {required}")]
    InsufficientData {
        symbol: String,
        required: usize,
        actual: usize,
    },

    #[error("unknown symbol {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data for {symbol}: {reason}")]
    Parse { symbol: String, reason: String },

    /// Anything a remote provider reports (rate limit, auth, transport).
    #[error("provider error: {0}")]
    Provider(String),
}

/// How much history to request, in calendar days back from the newest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    pub days: u32,
}

impl Lookback {
    pub fn days(days: u32) -> Self {
        Self { days }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self { days: 365 }
    }
}

#[async_trait]
pub trait BarSource: Send + Sync {
    /// Bars for `symbol`, oldest first.
    async fn fetch(&self, symbol: &str, lookback: Lookback) -> Result<Vec<Bar>, FetchError>;

    fn name(&self) -> &str;
}

/// Separate "nothing at all" from "too little to analyze".
pub fn ensure_history(symbol: &str, bars: Vec<Bar>, required: usize) -> Result<Vec<Bar>, FetchError> {
    if bars.is_empty() {
        return Err(FetchError::NoData {
            symbol: symbol.to_string(),
        });
    }
    if bars.len() < required {
        return Err(FetchError::InsufficientData {
            symbol: symbol.to_string(),
            required,
            actual: bars.len(),
        });
    }
    Ok(bars)
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed context file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("context provider error: {0}")]
    Provider(String),
}

/// Optional fundamental data. Failures are logged by the caller and treated as absent.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn context(&self, symbol: &str) -> Result<Option<FundamentalContext>, ContextError>;
}

/// Context source that never has anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

#[async_trait]
impl ContextSource for NoContext {
    async fn context(&self, _symbol: &str) -> Result<Option<FundamentalContext>, ContextError> {
        Ok(None)
    }
}

/// Context held in memory, typically loaded once from a JSON file mapping
/// symbol to `{insider_trades?, headlines?, analyst?}`.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    by_symbol: HashMap<String, FundamentalContext>,
}

impl StaticContext {
    pub fn new(by_symbol: HashMap<String, FundamentalContext>) -> Self {
        Self { by_symbol }
    }

    pub fn from_json(content: &str) -> Result<Self, ContextError> {
        Ok(Self::new(serde_json::from_str(content)?))
    }

    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
        let content = std::fs::read_to_string(path).map_err(|source| ContextError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

#[async_trait]
impl ContextSource for StaticContext {
    async fn context(&self, symbol: &str) -> Result<Option<FundamentalContext>, ContextError> {
        Ok(self.by_symbol.get(symbol).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_history_distinguishes_empty_from_short() {
        assert!(matches!(
            ensure_history("AAA", Vec::new(), 50),
            Err(FetchError::NoData { .. })
        ));
    }

    #[tokio::test]
    async fn static_context_lookup() {
        let ctx = StaticContext::from_json(
            r#"{
                "AAPL": {"analyst": {"strong_buy": 5, "buy": 3}},
                "MSFT": {"headlines": [{"headline": "Cloud growth"}]}
            }"#,
        )
        .unwrap();
        assert_eq!(ctx.len(), 2);

        let aapl = ctx.context("AAPL").await.unwrap().unwrap();
        assert_eq!(aapl.analyst.unwrap().strong_buy, 5);
        assert!(aapl.headlines.is_none());
        assert!(ctx.context("TSLA").await.unwrap().is_none());
        assert!(NoContext.context("AAPL").await.unwrap().is_none());
    }

    #[test]
    fn malformed_context_is_an_error() {
        assert!(matches!(
            StaticContext::from_json("[1, 2]"),
            Err(ContextError::Parse(_))
        ));
    }
}
