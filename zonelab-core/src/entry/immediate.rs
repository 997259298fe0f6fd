//! Immediate: enter whenever the latest close sits inside a zone.

use super::{EntryContext, EntryDecision, EntryTiming};
use crate::config::{EntryConfig, EntryMethod};

const CONFIDENCE: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl EntryTiming for Immediate {
    fn method(&self) -> EntryMethod {
        EntryMethod::Immediate
    }

    fn min_candles(&self, _config: &EntryConfig) -> usize {
        1
    }

    fn detect(&self, ctx: &EntryContext<'_>) -> EntryDecision {
        let Some(price) = ctx.candles.last().map(|c| c.close) else {
            return EntryDecision::no_entry(self.method(), "no candles");
        };
        match ctx.zones.iter().find(|z| z.contains(price)) {
            Some(zone) => EntryDecision::entry(self.method(), CONFIDENCE, format!("Price in {}", zone.name()))
                .with_zone(zone.name()),
            None => EntryDecision::no_entry(self.method(), "price outside every zone"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::test_support::*;
    use crate::zones::ZoneName;

    #[test]
    fn fires_inside_zone() {
        let candles = bars(&quiet(3, 1.1000));
        let zones = [zone(ZoneName::SlowMaZone, 1.1002, 0.0005)];
        let config = EntryConfig::default();
        let decision = Immediate.evaluate(&EntryContext {
            candles: &candles,
            zones: &zones,
            config: &config,
        });
        assert!(decision.fires());
        assert_eq!(decision.confidence.value(), 30.0);
        assert_eq!(decision.zone, Some(ZoneName::SlowMaZone));
    }

    #[test]
    fn silent_outside_zones() {
        let candles = bars(&quiet(3, 1.2000));
        let zones = [zone(ZoneName::SlowMaZone, 1.1, 0.0005)];
        let config = EntryConfig::default();
        let decision = Immediate.evaluate(&EntryContext {
            candles: &candles,
            zones: &zones,
            config: &config,
        });
        assert!(!decision.fires());
        assert_eq!(decision.confidence.value(), 0.0);
    }
}
