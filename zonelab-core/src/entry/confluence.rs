//! Confluence confirmation: enter only when several independent confirmations agree.
//!
//! Confirmations: zone rejection and pullback completion (their own
//! confidences), a volume spike (+15) and a strong directional close (+20).
//! Fires when at least `min_confirmations` are present; confidence is the sum
//! capped at 95. Direction comes from rejection or pullback, else from the close.

use serde::{Deserialize, Serialize};

use super::{EntryContext, EntryDecision, EntryDetails, EntryTiming, PullbackCompletion, ZoneRejection};
use crate::config::{EntryConfig, EntryMethod};
use crate::domain::{Candle, Direction};

const VOLUME_CONFIDENCE: f64 = 15.0;
const CLOSE_CONFIDENCE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub name: String,
    pub confidence: f64,
}

impl Confirmation {
    fn new(name: &str, confidence: f64) -> Self {
        Self {
            name: name.to_string(),
            confidence,
        }
    }
}

/// Latest volume above `multiplier ×` the mean of the last `window` volumes.
pub fn volume_confirms(candles: &[Candle], window: usize, multiplier: f64) -> bool {
    if window == 0 || candles.len() < window {
        return false;
    }
    let recent = &candles[candles.len() - window..];
    let average = recent.iter().map(|c| c.volume).sum::<f64>() / window as f64;
    let latest = recent[recent.len() - 1].volume;
    average > 0.0 && latest > average * multiplier
}

/// Direction of a close near either end of the range.
pub fn strong_close(candle: &Candle, high: f64, low: f64) -> Option<Direction> {
    let position = candle.close_position().unwrap_or(0.5);
    if position > high {
        Some(Direction::Bullish)
    } else if position < low {
        Some(Direction::Bearish)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfluenceConfirmation;

impl EntryTiming for ConfluenceConfirmation {
    fn method(&self) -> EntryMethod {
        EntryMethod::ConfluenceConfirmation
    }

    fn min_candles(&self, _config: &EntryConfig) -> usize {
        2
    }

    fn detect(&self, ctx: &EntryContext<'_>) -> EntryDecision {
        let cfg = ctx.config;
        let mut confirmations = Vec::new();
        let mut direction = None;
        let mut zone = None;

        for decision in [ZoneRejection.evaluate(ctx), PullbackCompletion.evaluate(ctx)] {
            if decision.fires() {
                confirmations.push(Confirmation::new(
                    decision.method.as_str(),
                    decision.confidence.value(),
                ));
                direction = direction.or(decision.direction);
                zone = zone.or(decision.zone);
            }
        }
        if volume_confirms(ctx.candles, cfg.volume_window, cfg.volume_multiplier) {
            confirmations.push(Confirmation::new("VOLUME", VOLUME_CONFIDENCE));
        }
        let close_direction = ctx
            .candles
            .last()
            .and_then(|c| strong_close(c, cfg.strong_close_high, cfg.strong_close_low));
        if close_direction.is_some() {
            confirmations.push(Confirmation::new("PRICE_ACTION", CLOSE_CONFIDENCE));
        }

        if confirmations.len() < cfg.min_confirmations.max(1) {
            return EntryDecision::no_entry(
                self.method(),
                format!("{} of {} confirmations", confirmations.len(), cfg.min_confirmations),
            );
        }
        let total: f64 = confirmations.iter().map(|c| c.confidence).sum();
        let mut decision = EntryDecision::entry(
            self.method(),
            total.min(95.0),
            format!("{} confluences detected", confirmations.len()),
        )
        .with_direction(direction.or(close_direction))
        .with_details(EntryDetails::Confluence { confirmations });
        decision.zone = zone;
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::test_support::*;
    use crate::zones::ZoneName;

    fn evaluate(candles: &[Candle]) -> EntryDecision {
        let zones = [zone(ZoneName::FastMaZone, 1.1000, 0.0010)];
        let config = EntryConfig::default();
        ConfluenceConfirmation.evaluate(&EntryContext {
            candles,
            zones: &zones,
            config: &config,
        })
    }

    #[test]
    fn rejection_with_strong_close_fires() {
        let mut ohlc = quiet(4, 1.1050);
        ohlc.push((1.1004, 1.1010, 1.0985, 1.1008));
        let decision = evaluate(&bars(&ohlc));
        assert!(decision.fires());
        assert_eq!(decision.direction, Some(Direction::Bullish));
        // rejection 95 + strong close 20, capped
        assert_eq!(decision.confidence.value(), 95.0);
        let EntryDetails::Confluence { confirmations } = &decision.details else {
            panic!("expected confluence details");
        };
        assert_eq!(confirmations.len(), 2);
    }

    #[test]
    fn volume_and_close_alone_fire_without_zone() {
        let mut ohlc = quiet(4, 1.2000);
        ohlc.push((1.2000, 1.2010, 1.1999, 1.2009));
        let mut candles = bars(&ohlc);
        candles[4].volume = 5000.0;
        let decision = evaluate(&candles);
        assert!(decision.fires());
        assert_eq!(decision.confidence.value(), 35.0);
        assert_eq!(decision.direction, Some(Direction::Bullish));
        assert_eq!(decision.zone, None);
    }

    #[test]
    fn quiet_market_has_no_confirmations() {
        let decision = evaluate(&bars(&quiet(5, 1.2000)));
        assert!(!decision.fires());
    }

    #[test]
    fn strong_close_bands() {
        let c = bars(&[(1.0, 2.0, 0.0, 1.9), (1.0, 2.0, 0.0, 0.1), (1.0, 2.0, 0.0, 1.0)]);
        assert_eq!(strong_close(&c[0], 0.7, 0.3), Some(Direction::Bullish));
        assert_eq!(strong_close(&c[1], 0.7, 0.3), Some(Direction::Bearish));
        assert_eq!(strong_close(&c[2], 0.7, 0.3), None);
    }
}
