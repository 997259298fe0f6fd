//! Reversal patterns over the last few candles: pin bar on the latest candle,
//! engulfing on every pair, hammer/doji/shooting star on every candle and
//! stars on every triple.
//!
//! Directional patterns gain a bonus when price sits at a zone and another
//! when they agree with the trend bias.

use super::{patterns, PatternContext, PatternKind, PatternMatch, PatternMatcher, PriceActionResult};
use crate::config::{PriceActionConfig, PriceActionMethod};
use crate::zones::Zone;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReversalPatterns;

/// Inside the zone, or within `ratio × height` of either boundary.
pub fn is_near_zone(price: f64, zone: &Zone, ratio: f64) -> bool {
    let proximity = zone.height() * ratio;
    zone.contains(price)
        || (price - zone.upper()).abs() <= proximity
        || (price - zone.lower()).abs() <= proximity
}

impl ReversalPatterns {
    fn enhance(&self, found: &mut [PatternMatch], ctx: &PatternContext<'_>) {
        let cfg = ctx.config;
        let Some(price) = ctx.candles.last().map(|c| c.close) else {
            return;
        };
        let at_zone = ctx
            .zones
            .iter()
            .find(|z| is_near_zone(price, z, cfg.zone_proximity_ratio));
        let trend = ctx.trend.and_then(|t| t.bias.direction());

        for pattern in found.iter_mut() {
            let Some(direction) = pattern.direction.direction() else {
                continue;
            };
            if let Some(zone) = at_zone {
                pattern.confidence = pattern.confidence.adjusted(cfg.zone_context_bonus);
                pattern.description = format!("{} at {}", pattern.description, zone.name());
            }
            if trend == Some(direction) {
                pattern.confidence = pattern.confidence.adjusted(cfg.trend_alignment_bonus);
                pattern.metadata.insert("trend_alignment".into(), 1.0);
            }
        }
    }
}

impl PatternMatcher for ReversalPatterns {
    fn method(&self) -> PriceActionMethod {
        PriceActionMethod::ReversalPatterns
    }

    fn min_candles(&self, config: &PriceActionConfig) -> usize {
        config.reversal_lookback.max(1)
    }

    fn scan(&self, ctx: &PatternContext<'_>) -> PriceActionResult {
        let thresholds = &ctx.config.candles;
        let recent = ctx.recent(ctx.config.reversal_lookback);
        let mut found = Vec::new();

        if let Some(latest) = recent.last() {
            found.extend(patterns::pin_bar(latest, thresholds));
        }
        found.extend(
            recent
                .windows(2)
                .filter_map(|w| patterns::engulfing(&w[0], &w[1], thresholds)),
        );
        for candle in recent {
            found.extend(
                patterns::single_candle(candle, thresholds)
                    .into_iter()
                    .filter(|p| matches!(p.kind, PatternKind::Hammer | PatternKind::Doji | PatternKind::ShootingStar)),
            );
        }
        found.extend(
            recent
                .windows(3)
                .filter_map(|w| patterns::star(&w[0], &w[1], &w[2], thresholds)),
        );

        self.enhance(&mut found, ctx);
        PriceActionResult::compile(self.method(), found)
    }
}
