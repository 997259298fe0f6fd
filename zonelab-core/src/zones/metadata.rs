//! Touch and rejection counts over recent candles.
//!
//! A candle touches a zone when its range overlaps the band. A touch is also a
//! rejection when the wick beyond the center exceeds `body × ratio`:
//! upper side needs `high ≥ center` with the body below the center,
//! lower side needs `low ≤ center` with the body above it.

use serde::Serialize;

use super::{Zone, ZoneQuality};
use crate::config::ZoneMetadataConfig;
use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ZoneMetadata {
    pub touches: usize,
    pub rejections: usize,
    pub quality: ZoneQuality,
}

fn is_rejection(candle: &Candle, center: f64, ratio: f64) -> bool {
    let body = candle.body();
    let upper = candle.high >= center && candle.body_top() < center && candle.upper_wick() > body * ratio;
    let lower = candle.low <= center && candle.body_bottom() > center && candle.lower_wick() > body * ratio;
    upper || lower
}

/// Count touches and rejections over `recent`; fewer candles than the lookback
/// yields an empty LOW grade.
pub fn zone_metadata(recent: &[Candle], zone: &Zone, config: &ZoneMetadataConfig) -> ZoneMetadata {
    if recent.len() < config.lookback {
        return ZoneMetadata::default();
    }
    let window = &recent[recent.len() - config.lookback..];

    let mut touches = 0;
    let mut rejections = 0;
    for candle in window.iter().filter(|c| zone.touched_by(c)) {
        touches += 1;
        if is_rejection(candle, zone.center(), config.wick_rejection_ratio) {
            rejections += 1;
        }
    }

    let quality = if rejections >= 2 && touches >= config.min_touches {
        ZoneQuality::High
    } else if rejections >= 1 && touches >= config.min_touches {
        ZoneQuality::Medium
    } else {
        ZoneQuality::Low
    };
    ZoneMetadata {
        touches,
        rejections,
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneMethod;
    use crate::indicators::make_candles;
    use crate::zones::{ZoneName, ZoneSizing};

    fn zone(center: f64, width: f64) -> Zone {
        Zone::new(
            ZoneName::FastMaZone,
            center,
            width,
            ZoneMethod::Fixed,
            ZoneSizing::Fixed { pips: 0.0 },
            0.01,
        )
        .unwrap()
    }

    fn hammer_at(mut candle: Candle, center: f64) -> Candle {
        candle.open = center + 1.0;
        candle.close = center + 1.2;
        candle.high = center + 1.3;
        candle.low = center - 1.0;
        candle
    }

    #[test]
    fn short_window_is_low() {
        let candles = make_candles(&[100.0; 5]);
        let meta = zone_metadata(&candles, &zone(100.0, 1.0), &ZoneMetadataConfig::default());
        assert_eq!(meta, ZoneMetadata::default());
    }

    #[test]
    fn counts_touches_without_rejections() {
        let candles = make_candles(&[100.0; 20]);
        let meta = zone_metadata(&candles, &zone(100.0, 0.5), &ZoneMetadataConfig::default());
        assert_eq!(meta.touches, 20);
        assert_eq!(meta.rejections, 0);
        assert_eq!(meta.quality, ZoneQuality::Low);
    }

    #[test]
    fn two_rejections_grade_high() {
        let mut candles = make_candles(&[110.0; 20]);
        candles[15] = hammer_at(candles[15], 100.0);
        candles[18] = hammer_at(candles[18], 100.0);
        let meta = zone_metadata(&candles, &zone(100.0, 0.5), &ZoneMetadataConfig::default());
        assert_eq!(meta.touches, 2);
        assert_eq!(meta.rejections, 2);
        assert_eq!(meta.quality, ZoneQuality::High);
    }

    #[test]
    fn one_rejection_grades_medium() {
        let mut candles = make_candles(&[110.0; 20]);
        candles[15] = hammer_at(candles[15], 100.0);
        candles[16].low = 100.2;
        let meta = zone_metadata(&candles, &zone(100.0, 0.5), &ZoneMetadataConfig::default());
        assert_eq!(meta.touches, 2);
        assert_eq!(meta.rejections, 1);
        assert_eq!(meta.quality, ZoneQuality::Medium);
    }
}
