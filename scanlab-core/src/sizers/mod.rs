//! Position sizers: turn a risk budget and volatility into a position plan.
//!
//! Sizers are signal-agnostic beyond the trade direction: the detector decides
//! whether to trade, the sizer decides how much and where the exits sit.

pub mod atr_risk;

pub use atr_risk::{AtrRiskSizer, RiskParams};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SignalType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("degenerate risk: {reason}")]
    DegenerateRisk { reason: String },
}

impl SizingError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateRisk {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountError {
    #[error("account_size must be positive and finite, got {0}")]
    InvalidAccountSize(f64),

    #[error("risk_fraction must be in (0, 1], got {0}")]
    InvalidRiskFraction(f64),
}

/// Account parameters shared by every sizing decision in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub account_size: f64,
    pub risk_fraction: f64,
}

impl Account {
    pub fn new(account_size: f64, risk_fraction: f64) -> Result<Self, AccountError> {
        let account = Self {
            account_size,
            risk_fraction,
        };
        account.validate()?;
        Ok(account)
    }

    pub fn validate(&self) -> Result<(), AccountError> {
        if !self.account_size.is_finite() || self.account_size <= 0.0 {
            return Err(AccountError::InvalidAccountSize(self.account_size));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(AccountError::InvalidRiskFraction(self.risk_fraction));
        }
        Ok(())
    }

    /// Dollars put at risk on one trade.
    pub fn risk_amount(&self) -> f64 {
        self.account_size * self.risk_fraction
    }
}

impl Default for Account {
    fn default() -> Self {
        Self {
            account_size: 100_000.0,
            risk_fraction: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPlan {
    pub action: SignalType,
    pub entry: f64,
    pub shares: u64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub secondary_target: f64,
    pub position_value: f64,
    pub risk_amount: f64,
    pub risk_reward: f64,
}

/// Position sizing logic.
///
/// # Responsibilities
/// - Convert account risk budget + entry + volatility into shares
/// - Place stop and targets on the correct side for the direction
///
/// # Non-Responsibilities
/// - Sizers do NOT decide whether to trade (that's the detector's job)
pub trait PositionSizer: Send + Sync {
    fn plan(
        &self,
        account: &Account,
        action: SignalType,
        entry: f64,
        atr: f64,
    ) -> Result<PositionPlan, SizingError>;

    /// Sizer name for logging
    fn name(&self) -> &str;
}
