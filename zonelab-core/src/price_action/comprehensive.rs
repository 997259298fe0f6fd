//! Comprehensive: every other matcher's patterns compiled together.
//!
//! Confluence contributes its patterns only when it found no groups, since
//! with groups its patterns repeat the basic, reversal and momentum findings.

use super::{
    BasicPatterns, ConfluencePatterns, ContinuationPatterns, MomentumPatterns, PatternContext,
    PatternMatcher, PriceActionResult, ReversalPatterns,
};
use crate::config::{PriceActionConfig, PriceActionMethod};

#[derive(Debug, Clone, Copy, Default)]
pub struct Comprehensive;

impl PatternMatcher for Comprehensive {
    fn method(&self) -> PriceActionMethod {
        PriceActionMethod::Comprehensive
    }

    fn min_candles(&self, config: &PriceActionConfig) -> usize {
        BasicPatterns.min_candles(config)
    }

    fn scan(&self, ctx: &PatternContext<'_>) -> PriceActionResult {
        let matchers: [&dyn PatternMatcher; 4] = [
            &BasicPatterns,
            &ReversalPatterns,
            &ContinuationPatterns,
            &MomentumPatterns,
        ];
        let mut found = Vec::new();
        for matcher in matchers {
            found.extend(matcher.analyze(ctx).patterns);
        }
        let confluence = ConfluencePatterns.analyze(ctx);
        if confluence.confluences.is_empty() {
            found.extend(confluence.patterns);
        }
        PriceActionResult::compile(self.method(), found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;
    use crate::price_action::PriceActionSignal;
    use crate::trend::test_support::trending_closes;

    fn analyze(closes: &[f64]) -> PriceActionResult {
        let candles = make_candles(closes);
        let config = PriceActionConfig::default();
        Comprehensive.analyze(&PatternContext {
            candles: &candles,
            zones: &[],
            trend: None,
            config: &config,
        })
    }

    #[test]
    fn steady_decline_is_bearish() {
        let result = analyze(&trending_closes(30, 150.0, -1.0));
        assert_eq!(result.signal, PriceActionSignal::Bearish);
        assert_eq!(result.method, PriceActionMethod::Comprehensive);
    }

    #[test]
    fn short_input_still_runs_basic_patterns() {
        let result = analyze(&[100.0, 100.0]);
        assert!(!result.is_degraded());
        assert_eq!(result.signal, PriceActionSignal::Neutral);
    }
}
