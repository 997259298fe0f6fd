//! Pullback completion: price dipped (or rallied) into a zone over the last
//! three candles and the latest close has recovered past that extreme.
//!
//! Direction comes from the latest close against the close two bars earlier.
//! confidence = min(50 + min(recovery × 100, 30), 85), recovery relative to the extreme.

use super::{EntryContext, EntryDecision, EntryDetails, EntryTiming};
use crate::config::{EntryConfig, EntryMethod};
use crate::domain::{Candle, Direction};

/// A completed pullback and its extreme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pullback {
    pub direction: Direction,
    pub extreme: f64,
    pub recovery_strength: f64,
}

impl Pullback {
    pub fn confidence(&self) -> f64 {
        (50.0 + (self.recovery_strength * 100.0).min(30.0)).floor().min(85.0)
    }
}

/// Pullback over `recent`, or `None` when it has not completed.
pub fn analyze_pullback(recent: &[Candle]) -> Option<Pullback> {
    let [.., third_last, _, latest] = recent else {
        return None;
    };
    let last3 = &recent[recent.len() - 3..];
    if latest.close > third_last.close {
        let low = last3.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        (low > 0.0 && latest.close > low && latest.high > low).then(|| Pullback {
            direction: Direction::Bullish,
            extreme: low,
            recovery_strength: (latest.close - low) / low,
        })
    } else {
        let high = last3.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        (high > 0.0 && latest.close < high && latest.low < high).then(|| Pullback {
            direction: Direction::Bearish,
            extreme: high,
            recovery_strength: (high - latest.close) / high,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PullbackCompletion;

impl EntryTiming for PullbackCompletion {
    fn method(&self) -> EntryMethod {
        EntryMethod::PullbackCompletion
    }

    fn min_candles(&self, config: &EntryConfig) -> usize {
        config.pullback_lookback.max(3)
    }

    fn detect(&self, ctx: &EntryContext<'_>) -> EntryDecision {
        let recent = ctx.recent(ctx.config.pullback_lookback.max(3));
        let Some(pullback) = analyze_pullback(recent) else {
            return EntryDecision::no_entry(self.method(), "pullback not completed");
        };
        match ctx.zones.iter().find(|z| z.contains(pullback.extreme)) {
            Some(zone) => EntryDecision::entry(
                self.method(),
                pullback.confidence(),
                format!("Pullback completion in {}", zone.name()),
            )
            .with_zone(zone.name())
            .with_direction(Some(pullback.direction))
            .with_details(EntryDetails::Pullback {
                extreme: pullback.extreme,
                recovery_strength: pullback.recovery_strength,
            }),
            None => EntryDecision::no_entry(self.method(), "pullback extreme outside every zone"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::test_support::*;
    use crate::zones::ZoneName;

    fn evaluate(ohlc: &[(f64, f64, f64, f64)]) -> EntryDecision {
        let candles = bars(ohlc);
        let zones = [zone(ZoneName::SlowMaZone, 1.1000, 0.0010)];
        let config = EntryConfig::default();
        PullbackCompletion.evaluate(&EntryContext {
            candles: &candles,
            zones: &zones,
            config: &config,
        })
    }

    #[test]
    fn bullish_pullback_into_zone() {
        let mut ohlc = quiet(7, 1.1050);
        ohlc.extend([
            (1.1030, 1.1032, 1.1000, 1.1002),
            (1.1002, 1.1010, 1.0995, 1.1008),
            (1.1008, 1.1060, 1.1005, 1.1055),
        ]);
        let decision = evaluate(&ohlc);
        assert!(decision.fires());
        assert_eq!(decision.direction, Some(Direction::Bullish));
        assert_eq!(decision.confidence.value(), 50.0);
    }

    #[test]
    fn extreme_outside_zones_is_no_entry() {
        let decision = evaluate(&quiet(10, 1.2000));
        assert!(!decision.fires());
    }

    #[test]
    fn confidence_caps() {
        let pullback = Pullback {
            direction: Direction::Bearish,
            extreme: 1.0,
            recovery_strength: 0.5,
        };
        assert_eq!(pullback.confidence(), 80.0);
    }

    #[test]
    fn needs_lookback_candles() {
        assert!(!evaluate(&quiet(9, 1.1000)).fires());
    }
}
