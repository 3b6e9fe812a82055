//! ScanLab CLI: scan a universe or analyze one symbol.
//!
//! Commands:
//! - `scan`: rank many symbols by composite score, with an optional filter
//! - `analyze`: full scored snapshot for one symbol, as JSON
//!
//! Bars come from a directory of CSV files (`--data-dir`) or from the
//! deterministic synthetic source (`--synthetic`). Settings load from an
//! optional TOML file, then `.env` / environment overrides.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use scanlab_core::ScoredSnapshot;
use scanlab_runner::{
    BarSource, ContextSource, CsvBarSource, Lookback, NoContext, ScanConfig, ScanFilter,
    ScanOutcome, Scanner, SignalLog, StaticContext, SyntheticBarSource, Universe,
};

#[derive(Parser)]
#[command(
    name = "scanlab",
    about = "ScanLab: technical indicator scoring and universe scanner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every symbol in a universe and print the ranking.
    Scan {
        /// Symbols to scan (in addition to any universe file).
        symbols: Vec<String>,

        /// Universe TOML file with a [sectors] table.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Restrict the universe to one sector.
        #[arg(long, requires = "universe")]
        sector: Option<String>,

        /// all, strong_buy, buy, oversold, breakout.
        #[arg(long, default_value = "all")]
        filter: ScanFilter,

        /// Show at most this many ranked rows.
        #[arg(long)]
        top: Option<usize>,

        /// Append signalled symbols to this JSONL file.
        #[arg(long)]
        signal_log: Option<PathBuf>,

        /// Print the full outcome as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Analyze one symbol and print its scored snapshot as JSON.
    Analyze {
        symbol: String,

        #[command(flatten)]
        inputs: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Directory of <SYMBOL>.csv bar files.
    #[arg(long, conflicts_with = "synthetic")]
    data_dir: Option<PathBuf>,

    /// Use deterministic synthetic bars.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Last synthetic bar date (YYYY-MM-DD). Defaults to today.
    #[arg(long, requires = "synthetic")]
    anchor: Option<String>,

    /// Scan configuration TOML file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file of fundamental context keyed by symbol.
    #[arg(long)]
    context: Option<PathBuf>,
}

impl InputArgs {
    fn load_config(&self) -> Result<ScanConfig> {
        let config = match &self.config {
            Some(path) => ScanConfig::from_file(path)?,
            None => ScanConfig::default(),
        };
        let config = config.with_env()?;
        config.validate()?;
        Ok(config)
    }

    fn bar_source(&self, config: &ScanConfig) -> Result<Arc<dyn BarSource>> {
        if let Some(dir) = &self.data_dir {
            return Ok(Arc::new(CsvBarSource::new(dir).with_min_bars(config.min_bars)));
        }
        if !self.synthetic {
            bail!("one of --data-dir or --synthetic is required");
        }
        let anchor = self
            .anchor
            .as_deref()
            .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .transpose()
            .context("--anchor must be YYYY-MM-DD")?
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Ok(Arc::new(
            SyntheticBarSource::new(anchor).with_min_bars(config.min_bars),
        ))
    }

    fn context_source(&self) -> Result<Arc<dyn ContextSource>> {
        match &self.context {
            Some(path) => Ok(Arc::new(StaticContext::from_file(path)?)),
            None => Ok(Arc::new(NoContext)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "scanlab=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            symbols,
            universe,
            sector,
            filter,
            top,
            signal_log,
            json,
            inputs,
        } => run_scan(symbols, universe, sector, filter, top, signal_log, json, inputs).await,
        Commands::Analyze { symbol, inputs } => run_analyze(symbol, inputs).await,
    }
}

fn collect_symbols(
    mut symbols: Vec<String>,
    universe: Option<PathBuf>,
    sector: Option<String>,
) -> Result<Vec<String>> {
    if let Some(path) = universe {
        let universe = Universe::from_file(&path)?;
        match sector {
            Some(name) => symbols.extend(universe.sector_tickers(&name)?.iter().cloned()),
            None => symbols.extend(universe.all_tickers()),
        }
    }

    let mut seen = std::collections::HashSet::new();
    let symbols: Vec<String> = symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();

    if symbols.is_empty() {
        bail!("no symbols to scan: pass symbols or --universe");
    }
    Ok(symbols)
}

#[allow(clippy::too_many_arguments)]
async fn run_scan(
    symbols: Vec<String>,
    universe: Option<PathBuf>,
    sector: Option<String>,
    filter: ScanFilter,
    top: Option<usize>,
    signal_log: Option<PathBuf>,
    json: bool,
    inputs: InputArgs,
) -> Result<()> {
    let symbols = collect_symbols(symbols, universe, sector)?;
    let config = inputs.load_config()?;

    let mut scanner = Scanner::new(&config, inputs.bar_source(&config)?)?
        .with_context(inputs.context_source()?);
    if let Some(path) = signal_log {
        scanner = scanner.with_signal_log(SignalLog::new(path));
    }

    let mut outcome = scanner.scan(&symbols, filter).await;
    if let Some(n) = top {
        outcome.ranked.truncate(n);
    }

    if json {
        print_json(&outcome)?;
    } else {
        print_table(&outcome, filter);
    }
    Ok(())
}

async fn run_analyze(symbol: String, inputs: InputArgs) -> Result<()> {
    let config = inputs.load_config()?;
    let analyzer = config.build_analyzer()?;
    let symbol = symbol.trim().to_uppercase();

    let bars = inputs
        .bar_source(&config)?
        .fetch(&symbol, Lookback::days(config.lookback_days))
        .await?;
    let context = match inputs.context_source()?.context(&symbol).await {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "context unavailable");
            None
        }
    };

    let snapshot = analyzer.analyze(&symbol, &bars, context.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn print_json(outcome: &ScanOutcome) -> Result<()> {
    let failures: Vec<serde_json::Value> = outcome
        .failures
        .iter()
        .map(|f| serde_json::json!({ "symbol": f.symbol, "error": f.error.to_string() }))
        .collect();
    let doc = serde_json::json!({
        "summary": outcome.summary,
        "ranked": outcome.ranked,
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn print_table(outcome: &ScanOutcome, filter: ScanFilter) {
    let summary = &outcome.summary;
    println!();
    println!("=== Scan Result ({filter}) ===");
    println!("Scanned:        {}", summary.scanned);
    println!("Succeeded:      {}", summary.succeeded);
    println!("Failed:         {}", summary.failed);
    println!("Duration:       {:.2}s", summary.duration_seconds);
    println!();
    println!(
        "{:<8} {:>6} {:<12} {:>10} {:>7} {:>7}  {:<28} {}",
        "Symbol", "Score", "Class", "Price", "RSI", "VolX", "Signals", "Plan"
    );
    for snap in &outcome.ranked {
        println!("{}", format_row(snap));
    }

    if !summary.strong_buy_symbols.is_empty() {
        println!();
        println!("BUY signals:    {}", summary.strong_buy_symbols.join(", "));
    }
    if !summary.sell_symbols.is_empty() {
        println!("SHORT signals:  {}", summary.sell_symbols.join(", "));
    }
    for failure in &outcome.failures {
        println!("FAILED: {}: {}", failure.symbol, failure.error);
    }
}

fn format_row(snap: &ScoredSnapshot) -> String {
    let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    let signals = snap
        .signals
        .iter()
        .map(|s| s.reason.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let plan = match &snap.plan {
        Some(p) => format!(
            "{} {} @ {:.2} stop {:.2} target {:.2}",
            p.action,
            p.shares,
            p.entry,
            p.stop_loss,
            p.take_profit
        ),
        None => snap.sizing_note.clone().unwrap_or_default(),
    };
    format!(
        "{:<8} {:>6} {:<12} {:>10.2} {:>7} {:>7}  {:<28} {}",
        snap.symbol,
        snap.score,
        snap.classification.as_str(),
        snap.price,
        opt(snap.rsi()),
        opt(snap.volume_ratio()),
        signals,
        plan
    )
}
