//! Breakout retest: price broke out of a zone, held beyond it, and the latest
//! candle came back to test the broken edge.
//!
//! Bullish, within the lookback window:
//!   1. a break candle closes above `upper` after the prior close was at or below it;
//!   2. every close after the break stays above `center`;
//!   3. the latest candle's low re-enters the zone (≤ upper) and it closes above `upper`.
//! Bearish is the mirror image on `lower`.
//! hold ratio = share of closes between the break and the latest candle still beyond the edge.
//! confidence = 55 + min(hold × 20, 20) + min(bars since break, 10), capped at 90.

use super::{EntryContext, EntryDecision, EntryDetails, EntryTiming};
use crate::config::{EntryConfig, EntryMethod};
use crate::domain::{Candle, Direction};
use crate::zones::Zone;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retest {
    pub direction: Direction,
    pub break_close: f64,
    pub bars_since_break: usize,
    pub hold_ratio: f64,
}

impl Retest {
    pub fn confidence(&self) -> f64 {
        (55.0 + (self.hold_ratio * 20.0).min(20.0) + (self.bars_since_break.min(10) as f64)).min(90.0)
    }
}

/// Most recent valid breakout retest of `zone` in `window`.
pub fn detect_retest(window: &[Candle], zone: &Zone) -> Option<Retest> {
    [Direction::Bullish, Direction::Bearish]
        .into_iter()
        .find_map(|direction| detect_directional(window, zone, direction))
}

fn detect_directional(window: &[Candle], zone: &Zone, direction: Direction) -> Option<Retest> {
    let (latest, history) = window.split_last()?;
    let sign = direction.sign();
    let edge = match direction {
        Direction::Bullish => zone.upper(),
        Direction::Bearish => zone.lower(),
    };
    // Signed distance beyond a level in the breakout direction.
    let beyond = |price: f64, level: f64| (price - level) * sign > 0.0;

    let probe = match direction {
        Direction::Bullish => latest.low,
        Direction::Bearish => latest.high,
    };
    let retests = !beyond(probe, edge) && beyond(latest.close, edge);
    if !retests {
        return None;
    }

    let break_index = (1..history.len())
        .rev()
        .find(|&i| beyond(history[i].close, edge) && !beyond(history[i - 1].close, edge))?;

    let after_break = &history[break_index + 1..];
    let holds = after_break
        .iter()
        .chain(std::iter::once(latest))
        .all(|c| beyond(c.close, zone.center()));
    if !holds {
        return None;
    }

    let hold_ratio = if after_break.is_empty() {
        1.0
    } else {
        after_break.iter().filter(|c| beyond(c.close, edge)).count() as f64 / after_break.len() as f64
    };
    Some(Retest {
        direction,
        break_close: history[break_index].close,
        bars_since_break: history.len() - break_index,
        hold_ratio,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BreakoutRetest;

impl EntryTiming for BreakoutRetest {
    fn method(&self) -> EntryMethod {
        EntryMethod::BreakoutRetest
    }

    fn min_candles(&self, config: &EntryConfig) -> usize {
        config.breakout_lookback.max(3)
    }

    fn detect(&self, ctx: &EntryContext<'_>) -> EntryDecision {
        let window = ctx.recent(self.min_candles(ctx.config));
        for zone in ctx.zones {
            if let Some(retest) = detect_retest(window, zone) {
                return EntryDecision::entry(
                    self.method(),
                    retest.confidence(),
                    format!("Breakout retest of {}", zone.name()),
                )
                .with_zone(zone.name())
                .with_direction(Some(retest.direction))
                .with_details(EntryDetails::BreakoutRetest {
                    break_close: retest.break_close,
                    bars_since_break: retest.bars_since_break,
                    hold_ratio: retest.hold_ratio,
                });
            }
        }
        EntryDecision::no_entry(self.method(), "no breakout retest")
    }
}
