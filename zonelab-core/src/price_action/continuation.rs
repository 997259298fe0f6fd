//! Continuation patterns over the last candles: flag, inside bar and breakout.

use super::{patterns, PatternContext, PatternMatcher, PriceActionResult};
use crate::config::{PriceActionConfig, PriceActionMethod};

#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuationPatterns;

impl PatternMatcher for ContinuationPatterns {
    fn method(&self) -> PriceActionMethod {
        PriceActionMethod::ContinuationPatterns
    }

    fn min_candles(&self, config: &PriceActionConfig) -> usize {
        config.continuation_lookback.max(1)
    }

    fn scan(&self, ctx: &PatternContext<'_>) -> PriceActionResult {
        let cfg = ctx.config;
        let recent = ctx.recent(cfg.continuation_lookback);
        let mut found = Vec::new();

        found.extend(patterns::flag(recent, &cfg.flag));
        if let [.., prev, latest] = recent {
            found.extend(patterns::inside_bar(prev, latest));
        }
        found.extend(patterns::breakout(recent, cfg.breakout_lookback, cfg.breakout_threshold));

        PriceActionResult::compile(self.method(), found)
    }
}
