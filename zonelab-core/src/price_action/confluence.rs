//! Confluence: basic, reversal and momentum patterns grouped by direction.
//!
//! A direction with at least `min_confluence_patterns` patterns forms a group
//! whose confidence is the capped sum of its members. The score is the best
//! group plus a bonus per additional group. Without any group the first three
//! patterns are compiled as usual.

use serde::{Deserialize, Serialize};

use super::{
    BasicPatterns, MomentumPatterns, PatternContext, PatternMatch, PatternMatcher, PriceActionResult,
    PriceActionSignal, ReversalPatterns,
};
use crate::config::{PriceActionConfig, PriceActionMethod};
use crate::domain::{Confidence, Direction};

/// Patterns agreeing on one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceGroup {
    pub direction: Direction,
    pub patterns: Vec<PatternMatch>,
    pub combined_confidence: Confidence,
}

pub fn find_confluences(found: &[PatternMatch], min_patterns: usize) -> Vec<ConfluenceGroup> {
    [Direction::Bullish, Direction::Bearish]
        .into_iter()
        .filter_map(|direction| {
            let members: Vec<PatternMatch> = found
                .iter()
                .filter(|p| p.direction.direction() == Some(direction))
                .cloned()
                .collect();
            if members.is_empty() || members.len() < min_patterns {
                return None;
            }
            let sum: f64 = members.iter().map(|p| p.confidence.value()).sum();
            Some(ConfluenceGroup {
                direction,
                patterns: members,
                combined_confidence: Confidence::new(sum.min(100.0)),
            })
        })
        .collect()
}

/// Best group confidence plus `bonus` per extra group, capped at 100.
pub fn confluence_score(groups: &[ConfluenceGroup], bonus: f64) -> f64 {
    let Some(best) = groups
        .iter()
        .map(|g| g.combined_confidence.value())
        .reduce(f64::max)
    else {
        return 0.0;
    };
    (best + (groups.len() - 1) as f64 * bonus).min(100.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfluencePatterns;

impl PatternMatcher for ConfluencePatterns {
    fn method(&self) -> PriceActionMethod {
        PriceActionMethod::ConfluencePatterns
    }

    fn min_candles(&self, config: &PriceActionConfig) -> usize {
        BasicPatterns.min_candles(config)
    }

    fn scan(&self, ctx: &PatternContext<'_>) -> PriceActionResult {
        let cfg = ctx.config;
        let mut found = Vec::new();
        for result in [
            BasicPatterns.analyze(ctx),
            ReversalPatterns.analyze(ctx),
            MomentumPatterns.analyze(ctx),
        ] {
            found.extend(result.patterns);
        }

        let groups = find_confluences(&found, cfg.min_confluence_patterns);
        if groups.is_empty() {
            found.truncate(3);
            return PriceActionResult::compile(self.method(), found);
        }

        let count = |d: Direction| groups.iter().filter(|g| g.direction == d).count();
        let signal = match count(Direction::Bullish).cmp(&count(Direction::Bearish)) {
            std::cmp::Ordering::Greater => PriceActionSignal::Bullish,
            std::cmp::Ordering::Less => PriceActionSignal::Bearish,
            std::cmp::Ordering::Equal => PriceActionSignal::Neutral,
        };
        PriceActionResult {
            method: self.method(),
            signal,
            confidence: Confidence::new(confluence_score(&groups, cfg.confluence_group_bonus)),
            patterns: found,
            confluences: groups,
            degraded: None,
        }
    }
}
