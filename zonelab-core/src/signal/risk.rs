//! Stop-loss / take-profit levels and their reward-to-risk ratio.
//!
//! A `RiskReward` can only be built through [`RiskReward::new`], which checks
//! the levels sit on the correct sides of the entry and derives
//! `ratio = reward / risk` and both pip distances. Moving the stop or the
//! target goes through `new` again, so the derived fields never go stale.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Direction;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("pip size must be positive, got {0}")]
    InvalidPipSize(f64),
    #[error("{level} {value} is on the wrong side of entry {entry} for a {direction} trade")]
    WrongSide {
        level: &'static str,
        value: f64,
        entry: f64,
        direction: Direction,
    },
    #[error("ATR must be positive, got {0}")]
    DegenerateAtr(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskReward {
    direction: Direction,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    ratio: f64,
    risk_pips: f64,
    reward_pips: f64,
    pip_size: f64,
}

fn finite(field: &'static str, value: f64) -> Result<f64, RiskError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::NonFinite { field, value })
    }
}

impl RiskReward {
    pub fn new(
        direction: Direction,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        pip_size: f64,
    ) -> Result<Self, RiskError> {
        finite("entry_price", entry_price)?;
        finite("stop_loss", stop_loss)?;
        finite("take_profit", take_profit)?;
        if !pip_size.is_finite() || pip_size <= 0.0 {
            return Err(RiskError::InvalidPipSize(pip_size));
        }

        // Signed distances in the trade's favour must be positive.
        let risk = (entry_price - stop_loss) * direction.sign();
        let reward = (take_profit - entry_price) * direction.sign();
        if risk <= 0.0 {
            return Err(RiskError::WrongSide {
                level: "stop_loss",
                value: stop_loss,
                entry: entry_price,
                direction,
            });
        }
        if reward <= 0.0 {
            return Err(RiskError::WrongSide {
                level: "take_profit",
                value: take_profit,
                entry: entry_price,
                direction,
            });
        }

        Ok(Self {
            direction,
            entry_price,
            stop_loss,
            take_profit,
            ratio: reward / risk,
            risk_pips: risk / pip_size,
            reward_pips: reward / pip_size,
            pip_size,
        })
    }

    /// Levels at `atr × risk_multiplier` for the stop and
    /// `atr × risk_multiplier × reward_ratio` for the target.
    pub fn from_atr(
        direction: Direction,
        entry_price: f64,
        atr: f64,
        risk_multiplier: f64,
        reward_ratio: f64,
        pip_size: f64,
    ) -> Result<Self, RiskError> {
        finite("atr", atr)?;
        if atr <= 0.0 {
            return Err(RiskError::DegenerateAtr(atr));
        }
        let stop_distance = atr * risk_multiplier;
        let target_distance = stop_distance * reward_ratio;
        let sign = direction.sign();
        Self::new(
            direction,
            entry_price,
            entry_price - sign * stop_distance,
            entry_price + sign * target_distance,
            pip_size,
        )
    }

    pub fn with_stop_loss(&self, stop_loss: f64) -> Result<Self, RiskError> {
        Self::new(self.direction, self.entry_price, stop_loss, self.take_profit, self.pip_size)
    }

    pub fn with_take_profit(&self, take_profit: f64) -> Result<Self, RiskError> {
        Self::new(self.direction, self.entry_price, self.stop_loss, take_profit, self.pip_size)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn stop_loss(&self) -> f64 {
        self.stop_loss
    }

    pub fn take_profit(&self) -> f64 {
        self.take_profit
    }

    /// Reward divided by risk.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn risk_pips(&self) -> f64 {
        self.risk_pips
    }

    pub fn reward_pips(&self) -> f64 {
        self.reward_pips
    }

    pub fn pip_size(&self) -> f64 {
        self.pip_size
    }
}
