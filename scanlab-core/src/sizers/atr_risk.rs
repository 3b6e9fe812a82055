//! ATR Risk Sizer
//!
//! Position size based on volatility (ATR) and fixed risk per trade.
//! Classic risk management: risk X% of the account per trade, with the stop at Y * ATR.

use serde::{Deserialize, Serialize};

use crate::domain::SignalType;
use crate::sizers::{Account, PositionPlan, PositionSizer, SizingError};

/// Stop and target distances, in multiples of the stop distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    /// Stop distance in ATRs.
    pub stop_multiplier: f64,
    /// Primary target distance in stop distances.
    pub reward_ratio: f64,
    pub secondary_reward_ratio: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            stop_multiplier: 2.0,
            reward_ratio: 2.0,
            secondary_reward_ratio: 2.5,
        }
    }
}

/// ATR-based risk sizer
///
/// # Formula
/// ```text
/// risk_dollars  = account_size * risk_fraction
/// stop_distance = stop_multiplier * ATR
/// shares        = floor(risk_dollars / stop_distance)
/// ```
///
/// # Example
/// - Account: $100,000, risk 2% ($2,000)
/// - ATR: $2.00, multiplier 2x (stop at $4.00)
/// - Shares: $2,000 / $4.00 = 500
/// - Entry $50: stop $46, target $58, secondary $60
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AtrRiskSizer {
    params: RiskParams,
}

impl AtrRiskSizer {
    pub fn new(params: RiskParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }
}

impl PositionSizer for AtrRiskSizer {
    fn plan(
        &self,
        account: &Account,
        action: SignalType,
        entry: f64,
        atr: f64,
    ) -> Result<PositionPlan, SizingError> {
        if !atr.is_finite() || atr <= 0.0 {
            return Err(SizingError::degenerate(format!(
                "ATR must be positive, got {atr}"
            )));
        }
        if !entry.is_finite() || entry <= 0.0 {
            return Err(SizingError::degenerate(format!(
                "entry price must be positive, got {entry}"
            )));
        }

        let risk_amount = account.risk_amount();
        let stop_distance = self.params.stop_multiplier * atr;
        if stop_distance.is_nan() || stop_distance <= 0.0 {
            return Err(SizingError::degenerate("stop distance is not positive"));
        }

        let shares = (risk_amount / stop_distance).floor();
        if shares.is_nan() || shares < 1.0 {
            return Err(SizingError::degenerate(format!(
                "risk budget {risk_amount:.2} buys no shares at stop distance {stop_distance:.4}"
            )));
        }

        let reward = self.params.reward_ratio * stop_distance;
        let secondary = self.params.secondary_reward_ratio * stop_distance;
        let side = match action {
            SignalType::Buy => 1.0,
            SignalType::Short => -1.0,
        };

        Ok(PositionPlan {
            action,
            entry,
            shares: shares as u64,
            stop_loss: entry - side * stop_distance,
            take_profit: entry + side * reward,
            secondary_target: entry + side * secondary,
            position_value: shares * entry,
            risk_amount,
            risk_reward: reward / stop_distance,
        })
    }

    fn name(&self) -> &str {
        "AtrRisk"
    }
}
