//! Universe scanner: bounded-concurrency fan-out of per-symbol analysis.
//!
//! Each symbol becomes one future: fetch bars, fetch optional context, then
//! analyze on the blocking pool, all under a per-symbol timeout. At most
//! `workers` futures run at once. Every future returns its own
//! `(symbol, result)` value and a single collector partitions, filters and
//! ranks them; no state is shared between symbols.

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use scanlab_core::domain::SignalType;
use scanlab_core::scoring::Classification;
use scanlab_core::analysis::direction;
use scanlab_core::{Analyzer, PipelineError, ScoredSnapshot};

use crate::config::{ConfigError, ScanConfig};
use crate::history::{SignalLog, SignalRecord};
use crate::source::{BarSource, ContextSource, FetchError, Lookback, NoContext};

/// Which successful snapshots make it into the ranked output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanFilter {
    #[default]
    All,
    StrongBuy,
    /// STRONG_BUY or BUY
    Buy,
    /// RSI below 30
    Oversold,
    /// volume ratio above 2
    Breakout,
}

impl ScanFilter {
    pub fn matches(&self, snapshot: &ScoredSnapshot) -> bool {
        match self {
            Self::All => true,
            Self::StrongBuy => snapshot.classification == Classification::StrongBuy,
            Self::Buy => matches!(
                snapshot.classification,
                Classification::StrongBuy | Classification::Buy
            ),
            Self::Oversold => snapshot.rsi().is_some_and(|rsi| rsi < 30.0),
            Self::Breakout => snapshot.volume_ratio().is_some_and(|v| v > 2.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::StrongBuy => "strong_buy",
            Self::Buy => "buy",
            Self::Oversold => "oversold",
            Self::Breakout => "breakout",
        }
    }
}

impl fmt::Display for ScanFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Self::All),
            "strong_buy" => Ok(Self::StrongBuy),
            "buy" => Ok(Self::Buy),
            "oversold" => Ok(Self::Oversold),
            "breakout" => Ok(Self::Breakout),
            other => Err(format!(
                "unknown scan filter '{other}' (expected all, strong_buy, buy, oversold, breakout)"
            )),
        }
    }
}

/// Why one symbol produced no snapshot. Never escapes the scan.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("timed out after {secs:.1}s")]
    Timeout { secs: f64 },

    #[error(transparent)]
    Analysis(#[from] PipelineError),

    #[error("analysis task failed: {0}")]
    Worker(String),
}

#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: SymbolError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scanned: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Symbols whose signals resolve to BUY, in rank order.
    pub strong_buy_symbols: Vec<String>,
    /// Symbols whose signals resolve to SHORT, in rank order. Never overlaps
    /// `strong_buy_symbols`.
    pub sell_symbols: Vec<String>,
    pub duration_seconds: f64,
}

#[derive(Debug)]
pub struct ScanOutcome {
    /// Filtered snapshots, score descending then symbol ascending.
    pub ranked: Vec<ScoredSnapshot>,
    /// Failed symbols, sorted by symbol.
    pub failures: Vec<SymbolFailure>,
    pub summary: ScanSummary,
}

/// Score descending, ties broken by ascending symbol.
pub fn rank(snapshots: &mut [ScoredSnapshot]) {
    snapshots.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.symbol.cmp(&b.symbol)));
}

/// BUY and SHORT symbol lists, each symbol placed by the same direction
/// rule its position plan uses. Unsignalled symbols appear in neither.
pub fn split_by_direction(snapshots: &[ScoredSnapshot]) -> (Vec<String>, Vec<String>) {
    let mut buys = Vec::new();
    let mut shorts = Vec::new();
    for snapshot in snapshots {
        match direction(&snapshot.signals) {
            Some(SignalType::Buy) => buys.push(snapshot.symbol.clone()),
            Some(SignalType::Short) => shorts.push(snapshot.symbol.clone()),
            None => {}
        }
    }
    (buys, shorts)
}

pub struct Scanner {
    analyzer: Arc<Analyzer>,
    bars: Arc<dyn BarSource>,
    context: Arc<dyn ContextSource>,
    workers: usize,
    timeout: Duration,
    lookback: Lookback,
    signal_log: Option<SignalLog>,
}

impl Scanner {
    /// Validate `config` and build a scanner over `bars`.
    pub fn new(config: &ScanConfig, bars: Arc<dyn BarSource>) -> Result<Self, ConfigError> {
        let analyzer = config.build_analyzer()?;
        Ok(Self {
            analyzer: Arc::new(analyzer),
            bars,
            context: Arc::new(NoContext),
            workers: config.workers,
            timeout: config.symbol_timeout(),
            lookback: Lookback::days(config.lookback_days),
            signal_log: config.signal_log.clone().map(SignalLog::new),
        })
    }

    pub fn with_context(mut self, context: Arc<dyn ContextSource>) -> Self {
        self.context = context;
        self
    }

    pub fn with_signal_log(mut self, log: SignalLog) -> Self {
        self.signal_log = Some(log);
        self
    }

    /// Override the per-symbol timeout (never zero).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn source_name(&self) -> &str {
        self.bars.name()
    }

    /// Analyze every symbol and rank the survivors of `filter`.
    pub async fn scan(&self, symbols: &[String], filter: ScanFilter) -> ScanOutcome {
        let started = Instant::now();
        info!(
            symbols = symbols.len(),
            workers = self.workers,
            source = self.bars.name(),
            %filter,
            "scan started"
        );

        let results: Vec<(String, Result<ScoredSnapshot, SymbolError>)> =
            stream::iter(symbols.iter().cloned())
                .map(|symbol| async move {
                    let result = self.scan_one(&symbol).await;
                    (symbol, result)
                })
                .buffer_unordered(self.workers)
                .collect()
                .await;

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (symbol, result) in results {
            match result {
                Ok(snapshot) => {
                    debug!(
                        symbol = %symbol,
                        score = snapshot.score,
                        classification = %snapshot.classification,
                        signals = snapshot.signals.len(),
                        "symbol analyzed"
                    );
                    successes.push(snapshot);
                }
                Err(error) => {
                    warn!(symbol = %symbol, error = %error, "symbol failed");
                    failures.push(SymbolFailure { symbol, error });
                }
            }
        }

        rank(&mut successes);
        failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        self.log_signals(&successes).await;

        let (strong_buy_symbols, sell_symbols) = split_by_direction(&successes);

        let summary = ScanSummary {
            scanned: symbols.len(),
            succeeded: successes.len(),
            failed: failures.len(),
            strong_buy_symbols,
            sell_symbols,
            duration_seconds: started.elapsed().as_secs_f64(),
        };

        let ranked: Vec<ScoredSnapshot> = successes
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();

        info!(
            scanned = summary.scanned,
            succeeded = summary.succeeded,
            failed = summary.failed,
            ranked = ranked.len(),
            duration_seconds = summary.duration_seconds,
            "scan finished"
        );

        ScanOutcome {
            ranked,
            failures,
            summary,
        }
    }

    async fn scan_one(&self, symbol: &str) -> Result<ScoredSnapshot, SymbolError> {
        let work = async {
            let bars = self.bars.fetch(symbol, self.lookback).await?;
            let context = match self.context.context(symbol).await {
                Ok(context) => context,
                Err(e) => {
                    warn!(symbol, error = %e, "context unavailable, scoring without it");
                    None
                }
            };

            let analyzer = Arc::clone(&self.analyzer);
            let owned = symbol.to_string();
            let snapshot = tokio::task::spawn_blocking(move || {
                analyzer.analyze(&owned, &bars, context.as_ref())
            })
            .await
            .map_err(|e| SymbolError::Worker(e.to_string()))??;
            Ok::<_, SymbolError>(snapshot)
        };

        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| SymbolError::Timeout {
                secs: self.timeout.as_secs_f64(),
            })?
    }

    async fn log_signals(&self, snapshots: &[ScoredSnapshot]) {
        let Some(log) = self.signal_log.clone() else {
            return;
        };
        let now = Utc::now();
        let records: Vec<SignalRecord> = snapshots
            .iter()
            .filter_map(|s| SignalRecord::from_snapshot(s, now))
            .collect();
        if records.is_empty() {
            return;
        }

        let count = records.len();
        let path = log.path().display().to_string();
        match tokio::task::spawn_blocking(move || log.append_all(&records)).await {
            Ok(Ok(())) => debug!(count, path = %path, "signals logged"),
            Ok(Err(e)) => warn!(path = %path, error = %e, "signal log write failed"),
            Err(e) => warn!(path = %path, error = %e, "signal log task failed"),
        }
    }
}
