//! Trend-adaptive zones: ATR-based width scaled by trend strength.
//! Strong trends get tighter zones; no trend result leaves the width unscaled.

use super::{atr_width, SizedWidth, ZoneContext, ZoneSizer, ZoneSizing};
use crate::config::{TrendStrengthMultipliers, ZoneMethod};
use crate::domain::Strength;

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendAdaptive;

fn strength_multiplier(strength: Strength, multipliers: &TrendStrengthMultipliers) -> f64 {
    match strength {
        Strength::Strong => multipliers.strong,
        Strength::Medium => multipliers.medium,
        Strength::Weak => multipliers.weak,
    }
}

impl ZoneSizer for TrendAdaptive {
    fn method(&self) -> ZoneMethod {
        ZoneMethod::TrendAdaptive
    }

    fn half_width(&self, ctx: &ZoneContext<'_>) -> SizedWidth {
        let base = atr_width(ctx);
        let strength = ctx.trend.map(|t| t.strength);
        let multiplier = strength.map_or(1.0, |s| strength_multiplier(s, &ctx.config.trend_multipliers));
        SizedWidth {
            half_width: base.half_width * multiplier,
            sizing: ZoneSizing::TrendAdaptive {
                strength,
                multiplier,
                base_width: base.half_width,
            },
        }
    }
}
