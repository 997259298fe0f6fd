//! Zone rejection: the latest candle probes through a zone edge and closes
//! back beyond the center with a long wick.
//!
//! Bullish: low ≤ lower, close > center, lower wick > body × ratio.
//! Bearish: high ≥ upper, close < center, upper wick > body × ratio.
//! wick strength = wick / body (5.0 for a zero body)
//! confidence = 45 + min(strength × 10, 30) + min(bounce / height × 20, 20), capped at 95.

use super::{EntryContext, EntryDecision, EntryDetails, EntryTiming};
use crate::config::{EntryConfig, EntryMethod};
use crate::domain::{Candle, Direction};
use crate::zones::Zone;

const ZERO_BODY_STRENGTH: f64 = 5.0;

/// A detected rejection of one zone by one candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rejection {
    pub direction: Direction,
    pub wick_strength: f64,
    pub bounce_distance: f64,
}

impl Rejection {
    pub fn confidence(&self, zone: &Zone) -> f64 {
        let wick_bonus = (self.wick_strength * 10.0).min(30.0);
        let height = zone.height();
        let bounce_bonus = if height > 0.0 {
            (self.bounce_distance / height * 20.0).min(20.0)
        } else {
            0.0
        };
        (45.0 + wick_bonus + bounce_bonus).floor().min(95.0)
    }
}

pub fn detect_rejection(candle: &Candle, zone: &Zone, ratio: f64) -> Option<Rejection> {
    let body = candle.body();
    let strength = |wick: f64| if body > 0.0 { wick / body } else { ZERO_BODY_STRENGTH };

    let lower_wick = candle.lower_wick();
    if candle.low <= zone.lower() && candle.close > zone.center() && lower_wick > body * ratio {
        return Some(Rejection {
            direction: Direction::Bullish,
            wick_strength: strength(lower_wick),
            bounce_distance: candle.close - candle.low,
        });
    }
    let upper_wick = candle.upper_wick();
    if candle.high >= zone.upper() && candle.close < zone.center() && upper_wick > body * ratio {
        return Some(Rejection {
            direction: Direction::Bearish,
            wick_strength: strength(upper_wick),
            bounce_distance: candle.high - candle.close,
        });
    }
    None
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneRejection;

impl EntryTiming for ZoneRejection {
    fn method(&self) -> EntryMethod {
        EntryMethod::ZoneRejection
    }

    fn min_candles(&self, _config: &EntryConfig) -> usize {
        3
    }

    fn detect(&self, ctx: &EntryContext<'_>) -> EntryDecision {
        let Some(latest) = ctx.candles.last() else {
            return EntryDecision::no_entry(self.method(), "no candles");
        };
        for zone in ctx.zones {
            if let Some(rejection) = detect_rejection(latest, zone, ctx.config.wick_rejection_ratio) {
                return EntryDecision::entry(
                    self.method(),
                    rejection.confidence(zone),
                    format!("Zone rejection from {}", zone.name()),
                )
                .with_zone(zone.name())
                .with_direction(Some(rejection.direction))
                .with_details(EntryDetails::Rejection {
                    wick_strength: rejection.wick_strength,
                    bounce_distance: rejection.bounce_distance,
                });
            }
        }
        EntryDecision::no_entry(self.method(), "no zone rejection")
    }
}
