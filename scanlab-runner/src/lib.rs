//! ScanLab Runner: universe scanning on top of `scanlab-core`.
//!
//! This crate provides:
//! - Scan configuration (TOML plus environment overrides)
//! - Bar and context source traits, with CSV and synthetic bar sources
//! - Universe files organized by sector
//! - The concurrent scanner: per-symbol timeout, ranking, filtering
//! - A JSONL signal log

pub mod config;
pub mod data_loader;
pub mod history;
pub mod scanner;
pub mod source;
pub mod universe;

pub use config::{ConfigError, ScanConfig};
pub use data_loader::{parse_csv, CsvBarSource, SyntheticBarSource};
pub use history::{LoggedPosition, SignalLog, SignalRecord};
pub use scanner::{
    rank, split_by_direction, ScanFilter, ScanOutcome, ScanSummary, Scanner, SymbolError,
    SymbolFailure,
};
pub use source::{
    BarSource, ContextError, ContextSource, FetchError, Lookback, NoContext, StaticContext,
};
pub use universe::{Universe, UniverseError};
