//! Candlestick and momentum pattern catalogue.
//!
//! Pure functions over candle slices. Ratios come from [`CandleThresholds`] and
//! [`PriceActionConfig`]; base confidences are fixed per pattern.
//! A zero-range candle matches no single-candle pattern.

use super::{PatternDirection, PatternKind, PatternMatch};
use crate::config::{CandleThresholds, FlagConfig};
use crate::domain::{Candle, Direction};

// ─── Single candle ───────────────────────────────────────────────────

/// Doji, hammer, shooting star and marubozu on one candle.
pub fn single_candle(candle: &Candle, t: &CandleThresholds) -> Vec<PatternMatch> {
    let mut found = Vec::new();
    let range = candle.range();
    if range <= 0.0 {
        return found;
    }
    let body = candle.body();
    let upper = candle.upper_wick();
    let lower = candle.lower_wick();

    if body < range * t.doji_body_ratio {
        found.push(PatternMatch::new(
            PatternKind::Doji,
            PatternDirection::Neutral,
            40.0,
            "Indecision candle",
        ));
    }
    if lower > body * t.hammer_wick_ratio && upper < body * t.hammer_upper_wick_ratio {
        found.push(PatternMatch::new(
            PatternKind::Hammer,
            PatternDirection::Bullish,
            60.0,
            "Potential reversal from support",
        ));
    }
    if upper > body * t.shooting_star_wick_ratio && lower < body * t.shooting_star_lower_wick_ratio {
        found.push(PatternMatch::new(
            PatternKind::ShootingStar,
            PatternDirection::Bearish,
            60.0,
            "Potential reversal from resistance",
        ));
    }
    if body > range * t.marubozu_body_ratio {
        let direction = if candle.close > candle.open {
            PatternDirection::Bullish
        } else {
            PatternDirection::Bearish
        };
        found.push(PatternMatch::new(
            PatternKind::Marubozu,
            direction,
            70.0,
            "Strong momentum candle",
        ));
    }
    found
}

/// Pin bar: a dominant wick over most of the range with a small body.
pub fn pin_bar(candle: &Candle, t: &CandleThresholds) -> Vec<PatternMatch> {
    let mut found = Vec::new();
    let range = candle.range();
    if range <= 0.0 {
        return found;
    }
    let body = candle.body();
    let upper = candle.upper_wick();
    let lower = candle.lower_wick();
    let small_body = body < range * t.pin_bar_body_ratio;

    if small_body && lower > range * t.pin_bar_wick_ratio && upper < range * t.pin_bar_opposite_wick_ratio {
        found.push(
            PatternMatch::new(
                PatternKind::BullishPinBar,
                PatternDirection::Bullish,
                80.0,
                "Strong rejection from support level",
            )
            .with_metadata("wick_ratio", lower / range),
        );
    }
    if small_body && upper > range * t.pin_bar_wick_ratio && lower < range * t.pin_bar_opposite_wick_ratio {
        found.push(
            PatternMatch::new(
                PatternKind::BearishPinBar,
                PatternDirection::Bearish,
                80.0,
                "Strong rejection from resistance level",
            )
            .with_metadata("wick_ratio", upper / range),
        );
    }
    found
}

// ─── Multi candle ────────────────────────────────────────────────────

/// Engulfing: reversal colours with the second body swallowing the first.
pub fn engulfing(prev: &Candle, cur: &Candle, t: &CandleThresholds) -> Option<PatternMatch> {
    let larger = cur.body() > prev.body() * t.engulfing_ratio;
    if !larger {
        return None;
    }
    if prev.is_bearish() && cur.is_bullish() && cur.open < prev.close && cur.close > prev.open {
        return Some(PatternMatch::new(
            PatternKind::BullishEngulfing,
            PatternDirection::Bullish,
            75.0,
            "Strong bullish reversal pattern",
        ));
    }
    if prev.is_bullish() && cur.is_bearish() && cur.open > prev.close && cur.close < prev.open {
        return Some(PatternMatch::new(
            PatternKind::BearishEngulfing,
            PatternDirection::Bearish,
            75.0,
            "Strong bearish reversal pattern",
        ));
    }
    None
}

/// Morning/evening star over three consecutive candles.
pub fn star(first: &Candle, middle: &Candle, last: &Candle, t: &CandleThresholds) -> Option<PatternMatch> {
    let small_middle = middle.body() < middle.range() * t.star_body_ratio;
    if !small_middle {
        return None;
    }
    let midpoint = first.body_midpoint();
    if first.is_bearish() && last.is_bullish() && last.close > midpoint {
        return Some(PatternMatch::new(
            PatternKind::MorningStar,
            PatternDirection::Bullish,
            85.0,
            "Strong bullish reversal pattern",
        ));
    }
    if first.is_bullish() && last.is_bearish() && last.close < midpoint {
        return Some(PatternMatch::new(
            PatternKind::EveningStar,
            PatternDirection::Bearish,
            85.0,
            "Strong bearish reversal pattern",
        ));
    }
    None
}

/// Inside bar: the latest range sits strictly inside the previous one.
pub fn inside_bar(prev: &Candle, cur: &Candle) -> Option<PatternMatch> {
    (cur.high < prev.high && cur.low > prev.low).then(|| {
        PatternMatch::new(
            PatternKind::InsideBar,
            PatternDirection::Continuation,
            50.0,
            "Consolidation pattern, breakout expected",
        )
    })
}

/// Flag: tight bodies relative to the window range after a net move.
pub fn flag(window: &[Candle], cfg: &FlagConfig) -> Option<PatternMatch> {
    if window.len() < cfg.min_candles.max(1) {
        return None;
    }
    let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let mean_body = window.iter().map(Candle::body).sum::<f64>() / window.len() as f64;
    if mean_body >= (high - low) * cfg.consolidation_ratio {
        return None;
    }

    let start = window[0].close;
    let end = window[window.len() - 1].close;
    let direction = if end > start * (1.0 + cfg.trend_threshold) {
        Direction::Bullish
    } else if end < start * (1.0 - cfg.trend_threshold) {
        Direction::Bearish
    } else {
        return None;
    };
    Some(
        PatternMatch::new(
            PatternKind::Flag,
            direction.into(),
            65.0,
            format!("{direction} flag continuation pattern"),
        )
        .with_metadata("net_move", (end - start) / start),
    )
}

/// Breakout: the latest high clears the highs of the previous `lookback − 1`
/// candles by `threshold` (breakdown symmetric on lows).
pub fn breakout(window: &[Candle], lookback: usize, threshold: f64) -> Vec<PatternMatch> {
    let mut found = Vec::new();
    if lookback < 2 || window.len() < lookback {
        return found;
    }
    let (latest, prior) = match window.split_last() {
        Some((latest, prior)) => (latest, &prior[prior.len() - (lookback - 1)..]),
        None => return found,
    };
    let recent_high = prior.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let recent_low = prior.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

    if latest.high > recent_high * (1.0 + threshold) {
        found.push(PatternMatch::new(
            PatternKind::BullishBreakout,
            PatternDirection::Bullish,
            70.0,
            "Breakout above recent resistance",
        ));
    }
    if latest.low < recent_low * (1.0 - threshold) {
        found.push(PatternMatch::new(
            PatternKind::BearishBreakdown,
            PatternDirection::Bearish,
            70.0,
            "Breakdown below recent support",
        ));
    }
    found
}

// ─── Momentum ────────────────────────────────────────────────────────

/// Close in the top or bottom `1 − ratio` of the range.
pub fn strong_close(candle: &Candle, ratio: f64) -> Option<PatternMatch> {
    let position = candle.close_position()?;
    let share = ((1.0 - ratio) * 100.0).round();
    if position > ratio {
        Some(
            PatternMatch::new(
                PatternKind::StrongBullishClose,
                PatternDirection::Bullish,
                60.0,
                format!("Close in top {share}% of range"),
            )
            .with_metadata("close_position", position),
        )
    } else if position < 1.0 - ratio {
        Some(
            PatternMatch::new(
                PatternKind::StrongBearishClose,
                PatternDirection::Bearish,
                60.0,
                format!("Close in bottom {share}% of range"),
            )
            .with_metadata("close_position", position),
        )
    } else {
        None
    }
}

/// Gap between non-overlapping ranges, relative to the previous close.
pub fn gap(prev: &Candle, cur: &Candle, min_gap: f64) -> Option<PatternMatch> {
    if prev.close == 0.0 {
        return None;
    }
    let (kind, direction, size) = if cur.low > prev.high {
        (PatternKind::GapUp, PatternDirection::Bullish, (cur.low - prev.high) / prev.close)
    } else if cur.high < prev.low {
        (PatternKind::GapDown, PatternDirection::Bearish, (prev.low - cur.high) / prev.close)
    } else {
        return None;
    };
    (size > min_gap).then(|| {
        PatternMatch::new(kind, direction, 65.0, format!("{kind} of {:.1}%", size * 100.0))
            .with_metadata("gap_size", size)
    })
}

/// Latest volume above `multiplier ×` the mean of the last `lookback` volumes.
pub fn high_volume(candles: &[Candle], lookback: usize, multiplier: f64) -> Option<PatternMatch> {
    if lookback == 0 || candles.len() < lookback {
        return None;
    }
    let window = &candles[candles.len() - lookback..];
    let average = window.iter().map(|c| c.volume).sum::<f64>() / lookback as f64;
    let latest = window[window.len() - 1].volume;
    if average <= 0.0 || latest <= average * multiplier {
        return None;
    }
    let ratio = latest / average;
    Some(
        PatternMatch::new(
            PatternKind::HighVolumeConfirmation,
            PatternDirection::Confirmation,
            25.0,
            format!("Volume {ratio:.1}x above average"),
        )
        .with_metadata("volume_ratio", ratio),
    )
}

/// Close displacement over the last `lookback` candles beyond `threshold`.
pub fn momentum_displacement(candles: &[Candle], lookback: usize, threshold: f64) -> Option<PatternMatch> {
    if lookback == 0 || candles.len() < lookback {
        return None;
    }
    let window = &candles[candles.len() - lookback..];
    let first = window[0].close;
    if first == 0.0 {
        return None;
    }
    let change = (window[window.len() - 1].close - first) / first;
    if change.abs() <= threshold {
        return None;
    }
    let direction = if change > 0.0 {
        Direction::Bullish
    } else {
        Direction::Bearish
    };
    Some(
        PatternMatch::new(
            PatternKind::MomentumPattern,
            direction.into(),
            55.0,
            format!("{direction} momentum detected"),
        )
        .with_metadata("momentum", change),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), open, high, low, close, 100.0)
    }

    fn kinds(found: &[PatternMatch]) -> Vec<PatternKind> {
        found.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn doji() {
        let found = single_candle(&candle(1.0, 1.5, 0.5, 1.01), &CandleThresholds::default());
        assert_eq!(kinds(&found), vec![PatternKind::Doji]);
        assert_eq!(found[0].direction, PatternDirection::Neutral);
        assert_eq!(found[0].confidence.value(), 40.0);
    }

    #[test]
    fn hammer_and_shooting_star() {
        let t = CandleThresholds::default();
        let hammer = single_candle(&candle(10.0, 10.55, 8.0, 10.5), &t);
        assert!(kinds(&hammer).contains(&PatternKind::Hammer));
        let star = single_candle(&candle(10.5, 12.5, 9.95, 10.0), &t);
        assert!(kinds(&star).contains(&PatternKind::ShootingStar));
    }

    #[test]
    fn marubozu_follows_close() {
        let t = CandleThresholds::default();
        let up = single_candle(&candle(10.0, 11.02, 9.99, 11.0), &t);
        assert_eq!(kinds(&up), vec![PatternKind::Marubozu]);
        assert_eq!(up[0].direction, PatternDirection::Bullish);
        let down = single_candle(&candle(11.0, 11.01, 9.98, 10.0), &t);
        assert_eq!(down[0].direction, PatternDirection::Bearish);
    }

    #[test]
    fn zero_range_matches_nothing() {
        let flat = candle(1.0, 1.0, 1.0, 1.0);
        assert!(single_candle(&flat, &CandleThresholds::default()).is_empty());
        assert!(pin_bar(&flat, &CandleThresholds::default()).is_empty());
        assert!(strong_close(&flat, 0.8).is_none());
    }

    #[test]
    fn bullish_pin_bar() {
        let found = pin_bar(&candle(10.0, 10.3, 8.0, 10.2), &CandleThresholds::default());
        assert_eq!(kinds(&found), vec![PatternKind::BullishPinBar]);
    }

    #[test]
    fn engulfing_pairs() {
        let t = CandleThresholds::default();
        let bullish = engulfing(&candle(10.0, 10.1, 9.4, 9.5), &candle(9.4, 10.3, 9.3, 10.2), &t);
        assert_eq!(bullish.map(|p| p.kind), Some(PatternKind::BullishEngulfing));
        let bearish = engulfing(&candle(9.5, 10.1, 9.4, 10.0), &candle(10.1, 10.2, 9.2, 9.3), &t);
        assert_eq!(bearish.map(|p| p.kind), Some(PatternKind::BearishEngulfing));
        let too_small = engulfing(&candle(10.0, 10.1, 9.4, 9.5), &candle(9.45, 10.1, 9.4, 9.95), &t);
        assert!(too_small.is_none());
    }

    #[test]
    fn morning_star() {
        let t = CandleThresholds::default();
        let found = star(
            &candle(10.0, 10.1, 8.9, 9.0),
            &candle(9.0, 9.3, 8.7, 9.05),
            &candle(9.1, 9.9, 9.0, 9.8),
            &t,
        );
        assert_eq!(found.map(|p| p.kind), Some(PatternKind::MorningStar));
    }

    #[test]
    fn inside_bar_is_strict() {
        let mother = candle(10.0, 11.0, 9.0, 10.5);
        assert!(inside_bar(&mother, &candle(10.2, 10.8, 9.5, 10.4)).is_some());
        assert!(inside_bar(&mother, &candle(10.2, 11.0, 9.5, 10.4)).is_none());
    }

    #[test]
    fn breakout_ignores_latest_candle_in_reference() {
        let mut window: Vec<Candle> = (0..9).map(|_| candle(100.0, 101.0, 99.0, 100.0)).collect();
        window.push(candle(100.0, 103.0, 99.5, 102.5));
        let found = breakout(&window, 10, 0.005);
        assert_eq!(kinds(&found), vec![PatternKind::BullishBreakout]);
        window.pop();
        window.push(candle(100.0, 101.2, 99.5, 101.0));
        assert!(breakout(&window, 10, 0.005).is_empty());
    }

    #[test]
    fn flag_needs_tight_bodies_and_a_net_move() {
        let cfg = FlagConfig::default();
        let drifting: Vec<Candle> = (0..6)
            .map(|i| {
                let c = 100.0 + i as f64 * 0.5;
                candle(c - 0.1, c + 2.0, c - 2.0, c)
            })
            .collect();
        let found = flag(&drifting, &cfg).unwrap();
        assert_eq!(found.direction, PatternDirection::Bullish);
        let flat: Vec<Candle> = (0..6).map(|_| candle(100.0, 102.0, 98.0, 100.1)).collect();
        assert!(flag(&flat, &cfg).is_none());
    }

    #[test]
    fn strong_close_and_gap() {
        assert_eq!(
            strong_close(&candle(10.0, 11.0, 9.0, 10.9), 0.8).map(|p| p.kind),
            Some(PatternKind::StrongBullishClose)
        );
        assert_eq!(
            strong_close(&candle(10.0, 11.0, 9.0, 9.1), 0.8).map(|p| p.kind),
            Some(PatternKind::StrongBearishClose)
        );
        let prev = candle(100.0, 101.0, 99.0, 100.5);
        assert_eq!(gap(&prev, &candle(102.0, 103.0, 101.5, 102.5), 0.002).map(|p| p.kind), Some(PatternKind::GapUp));
        assert!(gap(&prev, &candle(101.1, 103.0, 101.05, 102.5), 0.002).is_none());
    }

    #[test]
    fn high_volume_needs_a_spike() {
        let mut candles: Vec<Candle> = (0..10).map(|_| candle(1.0, 1.1, 0.9, 1.0)).collect();
        assert!(high_volume(&candles, 10, 2.0).is_none());
        candles[9].volume = 1000.0;
        let found = high_volume(&candles, 10, 2.0).unwrap();
        assert_eq!(found.direction, PatternDirection::Confirmation);
        assert_eq!(found.confidence.value(), 25.0);
    }

    #[test]
    fn momentum_displacement_sign() {
        let rising: Vec<Candle> = (0..15).map(|i| {
            let c = 100.0 + i as f64 * 0.2;
            candle(c, c + 0.1, c - 0.1, c)
        }).collect();
        let found = momentum_displacement(&rising, 15, 0.01).unwrap();
        assert_eq!(found.direction, PatternDirection::Bullish);
        assert!(momentum_displacement(&rising, 16, 0.01).is_none());
    }
}
