//! Basic patterns: single-candle patterns on the latest candle plus
//! engulfing on the latest pair.

use super::{patterns, PatternContext, PatternMatcher, PriceActionResult};
use crate::config::{PriceActionConfig, PriceActionMethod};

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPatterns;

impl PatternMatcher for BasicPatterns {
    fn method(&self) -> PriceActionMethod {
        PriceActionMethod::BasicPatterns
    }

    fn min_candles(&self, _config: &PriceActionConfig) -> usize {
        1
    }

    fn scan(&self, ctx: &PatternContext<'_>) -> PriceActionResult {
        let thresholds = &ctx.config.candles;
        let mut found = Vec::new();
        if let [.., latest] = ctx.candles {
            found.extend(patterns::single_candle(latest, thresholds));
        }
        if let [.., prev, latest] = ctx.candles {
            found.extend(patterns::engulfing(prev, latest, thresholds));
        }
        PriceActionResult::compile(self.method(), found)
    }
}
