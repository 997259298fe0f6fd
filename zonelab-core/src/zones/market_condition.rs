//! Market-condition zones: ATR-based width scaled by how directional recent
//! price movement is.
//!
//! efficiency = |c_last − c_first| / Σ|Δc| (0 for a zero path)
//! R² of a linear fit over the same closes.
//! TRENDING: efficiency and R² above their thresholds; RANGING: efficiency
//! below the ranging threshold; else MIXED.
//! Short history falls back to trend-adaptive width.

use serde::{Deserialize, Serialize};

use super::{atr_width, SizedWidth, TrendAdaptive, ZoneContext, ZoneSizer, ZoneSizing};
use crate::config::{MarketConditionConfig, ZoneMethod};
use crate::indicators::{closes, linear_fit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketCondition {
    Trending,
    Ranging,
    Mixed,
}

impl MarketCondition {
    pub fn multiplier(self, config: &MarketConditionConfig) -> f64 {
        match self {
            Self::Trending => config.trending_multiplier,
            Self::Ranging => config.ranging_multiplier,
            Self::Mixed => config.mixed_multiplier,
        }
    }
}

/// Net displacement over total path length.
pub fn efficiency_ratio(closes: &[f64]) -> f64 {
    let (Some(first), Some(last)) = (closes.first(), closes.last()) else {
        return 0.0;
    };
    let path: f64 = closes.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    if path > 0.0 {
        (last - first).abs() / path
    } else {
        0.0
    }
}

/// Condition with its efficiency and R², or `None` when the series is too short.
pub fn assess(closes: &[f64], config: &MarketConditionConfig) -> Option<(MarketCondition, f64, f64)> {
    if closes.len() < config.lookback || config.lookback < 2 {
        return None;
    }
    let window = &closes[closes.len() - config.lookback..];
    let efficiency = efficiency_ratio(window);
    let r_squared = linear_fit(window).map_or(0.0, |fit| fit.r_squared);
    let condition = if efficiency > config.trending_efficiency && r_squared > config.trending_r_squared {
        MarketCondition::Trending
    } else if efficiency < config.ranging_efficiency {
        MarketCondition::Ranging
    } else {
        MarketCondition::Mixed
    };
    Some((condition, efficiency, r_squared))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarketConditionSizer;

impl MarketConditionSizer {
    /// Width from the market condition, or `None` when history is short.
    pub(crate) fn condition_width(ctx: &ZoneContext<'_>) -> Option<SizedWidth> {
        let cfg = &ctx.config.market_condition;
        let (condition, efficiency, r_squared) = assess(&closes(ctx.series.candles()), cfg)?;
        let base = atr_width(ctx);
        let multiplier = condition.multiplier(cfg);
        Some(SizedWidth {
            half_width: base.half_width * multiplier,
            sizing: ZoneSizing::MarketCondition {
                condition,
                efficiency,
                r_squared,
                multiplier,
                base_width: base.half_width,
            },
        })
    }
}

impl ZoneSizer for MarketConditionSizer {
    fn method(&self) -> ZoneMethod {
        ZoneMethod::MarketCondition
    }

    fn half_width(&self, ctx: &ZoneContext<'_>) -> SizedWidth {
        Self::condition_width(ctx).unwrap_or_else(|| TrendAdaptive.half_width(ctx))
    }
}
