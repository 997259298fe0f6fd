//! Momentum patterns: strong close and gap on the latest candles, volume
//! confirmation, and close displacement over a longer window.
//!
//! Volume and displacement read the full candle history so their windows are
//! not cut short by the momentum lookback.

use super::{patterns, PatternContext, PatternMatcher, PriceActionResult};
use crate::config::{PriceActionConfig, PriceActionMethod};

#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumPatterns;

impl PatternMatcher for MomentumPatterns {
    fn method(&self) -> PriceActionMethod {
        PriceActionMethod::MomentumPatterns
    }

    fn min_candles(&self, config: &PriceActionConfig) -> usize {
        config.momentum_lookback.max(1)
    }

    fn scan(&self, ctx: &PatternContext<'_>) -> PriceActionResult {
        let cfg = ctx.config;
        let recent = ctx.recent(cfg.momentum_lookback);
        let mut found = Vec::new();

        if let Some(latest) = recent.last() {
            found.extend(patterns::strong_close(latest, cfg.strong_close_ratio));
        }
        if let [.., prev, latest] = recent {
            found.extend(patterns::gap(prev, latest, cfg.min_gap));
        }
        found.extend(patterns::high_volume(ctx.candles, cfg.volume_lookback, cfg.high_volume_multiplier));
        found.extend(patterns::momentum_displacement(
            ctx.candles,
            cfg.divergence_lookback,
            cfg.divergence_threshold,
        ));

        PriceActionResult::compile(self.method(), found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;
    use crate::price_action::{PatternKind, PriceActionSignal};
    use crate::trend::test_support::trending_closes;

    #[test]
    fn steady_rise_is_bullish_momentum() {
        let candles = make_candles(&trending_closes(20, 100.0, 0.5));
        let config = PriceActionConfig::default();
        let result = MomentumPatterns.analyze(&PatternContext {
            candles: &candles,
            zones: &[],
            trend: None,
            config: &config,
        });
        assert_eq!(result.signal, PriceActionSignal::Bullish);
        let kinds: Vec<_> = result.patterns.iter().map(|p| p.kind).collect();
        assert!(kinds.contains(&PatternKind::MomentumPattern));
    }

    #[test]
    fn volume_spike_confirms() {
        let mut candles = make_candles(&[100.0; 12]);
        candles[11].volume = 10_000.0;
        let config = PriceActionConfig::default();
        let result = MomentumPatterns.analyze(&PatternContext {
            candles: &candles,
            zones: &[],
            trend: None,
            config: &config,
        });
        assert!(result
            .patterns
            .iter()
            .any(|p| p.kind == PatternKind::HighVolumeConfirmation));
        assert_eq!(result.signal, PriceActionSignal::Neutral);
    }
}
