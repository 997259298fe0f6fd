//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for one instrument at one granularity.
///
/// Volume is a float because FX feeds report tick volume, and a feed without
/// volume simply reports zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Absolute body size.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.body_top()
    }

    pub fn lower_wick(&self) -> f64 {
        self.body_bottom() - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Midpoint of the body.
    pub fn body_midpoint(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    /// Where the close sits inside the range: 0.0 at the low, 1.0 at the high.
    /// `None` for a zero-range candle.
    pub fn close_position(&self) -> Option<f64> {
        let range = self.range();
        if range > 0.0 {
            Some((self.close - self.low) / range)
        } else {
            None
        }
    }

    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: finite prices, high above everything, low below everything.
    pub fn is_sane(&self) -> bool {
        if self.is_void() || !self.volume.is_finite() || self.volume < 0.0 {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            1.1000,
            1.1050,
            1.0980,
            1.1030,
            1200.0,
        )
    }

    #[test]
    fn candle_geometry() {
        let c = sample_candle();
        assert!((c.body() - 0.0030).abs() < 1e-12);
        assert!((c.range() - 0.0070).abs() < 1e-12);
        assert!((c.upper_wick() - 0.0020).abs() < 1e-12);
        assert!((c.lower_wick() - 0.0020).abs() < 1e-12);
        assert!(c.is_bullish());
        assert!(!c.is_bearish());
    }

    #[test]
    fn close_position_none_on_zero_range() {
        let mut c = sample_candle();
        c.high = 1.1;
        c.low = 1.1;
        c.open = 1.1;
        c.close = 1.1;
        assert_eq!(c.close_position(), None);
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut c = sample_candle();
        c.close = f64::NAN;
        assert!(c.is_void());
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut c = sample_candle();
        c.high = 1.0970;
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_missing_volume_deserializes_as_zero() {
        let json = r#"{"timestamp":"2024-01-02T00:00:00Z","open":1.0,"high":1.2,"low":0.9,"close":1.1}"#;
        let c: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(c.volume, 0.0);
    }
}
