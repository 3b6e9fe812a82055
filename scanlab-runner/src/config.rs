//! Scan configuration: TOML file, then environment overrides, then validation.
//!
//! One `ScanConfig` value is built at startup and passed down by reference.
//! Nothing here is global.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use scanlab_core::pipeline::{BackendKind, IndicatorParams, IndicatorPlan, Pipeline, PlanError};
use scanlab_core::signals::SignalDetector;
use scanlab_core::sizers::{Account, AccountError, AtrRiskSizer, RiskParams};
use scanlab_core::Analyzer;

pub const ENV_ACCOUNT_SIZE: &str = "ACCOUNT_SIZE";
pub const ENV_RISK_FRACTION: &str = "MAX_RISK_PER_TRADE";
pub const ENV_WORKERS: &str = "SCAN_WORKERS";
pub const ENV_SYMBOL_TIMEOUT: &str = "SYMBOL_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {var}={value:?} is not a valid {expected}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid account: {0}")]
    Account(#[from] AccountError),

    #[error("invalid indicator parameters: {0}")]
    Indicators(#[from] PlanError),

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
}

/// Everything a scan needs besides the symbol list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub account: Account,
    pub risk: RiskParams,
    pub indicators: IndicatorParams,
    pub backend: BackendKind,
    pub detector: SignalDetector,
    /// Concurrent symbol analyses.
    pub workers: usize,
    pub symbol_timeout_secs: u64,
    /// Calendar days of history requested per symbol.
    pub lookback_days: u32,
    pub min_bars: usize,
    /// JSON Lines file receiving one record per signalled symbol.
    pub signal_log: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            account: Account::default(),
            risk: RiskParams::default(),
            indicators: IndicatorParams::default(),
            backend: BackendKind::default(),
            detector: SignalDetector::default(),
            workers: 5,
            symbol_timeout_secs: 30,
            lookback_days: 365,
            min_bars: scanlab_core::pipeline::MIN_BARS,
            signal_log: None,
        }
    }
}

impl ScanConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable lookup. Unset variables leave the
    /// field untouched; set but unparsable ones are an error.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = parse_var(&lookup, ENV_ACCOUNT_SIZE, "number")? {
            self.account.account_size = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_RISK_FRACTION, "number")? {
            self.account.risk_fraction = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_WORKERS, "positive integer")? {
            self.workers = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_SYMBOL_TIMEOUT, "number of seconds")? {
            self.symbol_timeout_secs = v;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.account.validate()?;
        IndicatorPlan::standard(&self.indicators)?;
        if self.workers == 0 {
            return Err(ConfigError::Zero { field: "workers" });
        }
        if self.symbol_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "symbol_timeout_secs",
            });
        }
        if self.min_bars == 0 {
            return Err(ConfigError::Zero { field: "min_bars" });
        }
        Ok(())
    }

    pub fn symbol_timeout(&self) -> Duration {
        Duration::from_secs(self.symbol_timeout_secs)
    }

    /// Validate, then assemble the per-symbol analyzer this config describes.
    pub fn build_analyzer(&self) -> Result<Analyzer, ConfigError> {
        self.validate()?;
        let plan = IndicatorPlan::standard(&self.indicators)?;
        let pipeline = Pipeline::with_plan(plan, self.backend.build());
        Ok(Analyzer::new(pipeline.with_min_bars(self.min_bars), self.account)
            .with_detector(self.detector)
            .with_sizer(AtrRiskSizer::new(self.risk)))
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var,
                value: raw,
                expected,
            }),
    }
}
