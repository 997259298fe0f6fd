//! Composite zones: weighted blend of the ATR, volatility and market-condition
//! widths, normalised by the weight sum.
//!
//! The market-condition term uses the plain ATR width when history is too short
//! for the efficiency ratio.

use super::{
    atr_width, MarketConditionSizer, SizedWidth, VolatilityAdaptive, ZoneContext, ZoneSizer,
    ZoneSizing,
};
use crate::config::ZoneMethod;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeZones;

impl ZoneSizer for CompositeZones {
    fn method(&self) -> ZoneMethod {
        ZoneMethod::CompositeZones
    }

    fn half_width(&self, ctx: &ZoneContext<'_>) -> SizedWidth {
        let weights = &ctx.config.weights;
        let atr = atr_width(ctx).half_width;
        let volatility = VolatilityAdaptive.half_width(ctx).half_width;
        let market = MarketConditionSizer::condition_width(ctx).map_or(atr, |w| w.half_width);

        let total = weights.sum();
        let half_width = if total > 0.0 {
            (weights.atr * atr + weights.volatility * volatility + weights.market_condition * market) / total
        } else {
            atr
        };
        SizedWidth {
            half_width,
            sizing: ZoneSizing::Composite {
                atr_width: atr,
                volatility_width: volatility,
                market_width: market,
            },
        }
    }
}
