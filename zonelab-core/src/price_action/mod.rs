//! Price-action confirmation.
//!
//! Six matchers scan recent execution-timeframe candles for candlestick and
//! momentum patterns and compile them into a directional signal:
//! the side with more patterns wins with the sum of its confidences (capped at 100);
//! equal counts give NEUTRAL at 40; no patterns give NO_SIGNAL at 0.

pub mod basic;
pub mod comprehensive;
pub mod confluence;
pub mod continuation;
pub mod momentum;
pub mod patterns;
pub mod reversal;

pub use basic::BasicPatterns;
pub use comprehensive::Comprehensive;
pub use confluence::{find_confluences, ConfluenceGroup, ConfluencePatterns};
pub use continuation::ContinuationPatterns;
pub use momentum::MomentumPatterns;
pub use reversal::ReversalPatterns;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::config::{PriceActionConfig, PriceActionMethod};
use crate::domain::{Candle, Confidence, Direction};
use crate::trend::TrendAnalysis;
use crate::zones::Zone;

/// Confidence of a compiled result whose bullish and bearish counts tie.
pub const TIE_CONFIDENCE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    Doji,
    Hammer,
    ShootingStar,
    Marubozu,
    BullishEngulfing,
    BearishEngulfing,
    BullishPinBar,
    BearishPinBar,
    MorningStar,
    EveningStar,
    Flag,
    InsideBar,
    BullishBreakout,
    BearishBreakdown,
    StrongBullishClose,
    StrongBearishClose,
    GapUp,
    GapDown,
    HighVolumeConfirmation,
    MomentumPattern,
}

impl PatternKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Doji => "Doji",
            Self::Hammer => "Hammer",
            Self::ShootingStar => "Shooting Star",
            Self::Marubozu => "Marubozu",
            Self::BullishEngulfing => "Bullish Engulfing",
            Self::BearishEngulfing => "Bearish Engulfing",
            Self::BullishPinBar => "Bullish Pin Bar",
            Self::BearishPinBar => "Bearish Pin Bar",
            Self::MorningStar => "Morning Star",
            Self::EveningStar => "Evening Star",
            Self::Flag => "Flag Pattern",
            Self::InsideBar => "Inside Bar",
            Self::BullishBreakout => "Bullish Breakout",
            Self::BearishBreakdown => "Bearish Breakdown",
            Self::StrongBullishClose => "Strong Bullish Close",
            Self::StrongBearishClose => "Strong Bearish Close",
            Self::GapUp => "Gap Up",
            Self::GapDown => "Gap Down",
            Self::HighVolumeConfirmation => "High Volume Confirmation",
            Self::MomentumPattern => "Momentum Pattern",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternDirection {
    Bullish,
    Bearish,
    Neutral,
    Continuation,
    Confirmation,
}

impl PatternDirection {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Bullish => Some(Direction::Bullish),
            Self::Bearish => Some(Direction::Bearish),
            _ => None,
        }
    }
}

impl fmt::Display for PatternDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::Neutral => "NEUTRAL",
            Self::Continuation => "CONTINUATION",
            Self::Confirmation => "CONFIRMATION",
        })
    }
}

impl From<Direction> for PatternDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Bullish => Self::Bullish,
            Direction::Bearish => Self::Bearish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub kind: PatternKind,
    pub direction: PatternDirection,
    pub confidence: Confidence,
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, f64>,
}

impl PatternMatch {
    pub fn new(kind: PatternKind, direction: PatternDirection, confidence: f64, description: impl Into<String>) -> Self {
        Self {
            kind,
            direction,
            confidence: Confidence::new(confidence),
            description: description.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: f64) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn is_directional(&self) -> bool {
        self.direction.direction().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceActionSignal {
    NoSignal,
    Neutral,
    Bullish,
    Bearish,
}

impl PriceActionSignal {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Bullish => Some(Direction::Bullish),
            Self::Bearish => Some(Direction::Bearish),
            _ => None,
        }
    }
}

impl fmt::Display for PriceActionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoSignal => "NO_SIGNAL",
            Self::Neutral => "NEUTRAL",
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceActionResult {
    pub method: PriceActionMethod,
    pub signal: PriceActionSignal,
    pub confidence: Confidence,
    pub patterns: Vec<PatternMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confluences: Vec<ConfluenceGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl PriceActionResult {
    pub fn no_signal(method: PriceActionMethod) -> Self {
        Self {
            method,
            signal: PriceActionSignal::NoSignal,
            confidence: Confidence::ZERO,
            patterns: Vec::new(),
            confluences: Vec::new(),
            degraded: None,
        }
    }

    /// NO_SIGNAL at 0 with the reason attached.
    pub fn degraded(method: PriceActionMethod, reason: impl Into<String>) -> Self {
        Self {
            degraded: Some(reason.into()),
            ..Self::no_signal(method)
        }
    }

    /// Majority-by-count compile of a pattern list.
    pub fn compile(method: PriceActionMethod, patterns: Vec<PatternMatch>) -> Self {
        if patterns.is_empty() {
            return Self::no_signal(method);
        }
        let sum_of = |direction: PatternDirection| {
            patterns
                .iter()
                .filter(|p| p.direction == direction)
                .fold((0usize, 0.0), |(n, sum), p| (n + 1, sum + p.confidence.value()))
        };
        let (bullish, bullish_sum) = sum_of(PatternDirection::Bullish);
        let (bearish, bearish_sum) = sum_of(PatternDirection::Bearish);

        let (signal, confidence) = match bullish.cmp(&bearish) {
            std::cmp::Ordering::Greater => (PriceActionSignal::Bullish, bullish_sum.min(100.0)),
            std::cmp::Ordering::Less => (PriceActionSignal::Bearish, bearish_sum.min(100.0)),
            std::cmp::Ordering::Equal => (PriceActionSignal::Neutral, TIE_CONFIDENCE),
        };
        Self {
            method,
            signal,
            confidence: Confidence::new(confidence),
            patterns,
            confluences: Vec::new(),
            degraded: None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.signal.direction()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// Majority minus minority directional count, taken from the confluence
    /// groups when there are any.
    pub fn net_directional(&self) -> usize {
        let (bullish, bearish) = if self.confluences.is_empty() {
            let count = |d: PatternDirection| self.patterns.iter().filter(|p| p.direction == d).count();
            (count(PatternDirection::Bullish), count(PatternDirection::Bearish))
        } else {
            let count = |d: Direction| {
                self.confluences
                    .iter()
                    .filter(|g| g.direction == d)
                    .map(|g| g.patterns.len())
                    .sum::<usize>()
            };
            (count(Direction::Bullish), count(Direction::Bearish))
        };
        bullish.abs_diff(bearish)
    }

    /// A directional signal backed by at least two net patterns.
    pub fn strong(&self) -> bool {
        self.direction().is_some() && self.net_directional() >= 2
    }
}

/// Inputs to a pattern matcher.
#[derive(Debug, Clone, Copy)]
pub struct PatternContext<'a> {
    /// Execution-timeframe candles, oldest first.
    pub candles: &'a [Candle],
    pub zones: &'a [Zone],
    pub trend: Option<&'a TrendAnalysis>,
    pub config: &'a PriceActionConfig,
}

impl<'a> PatternContext<'a> {
    /// The last `n` candles (all of them when fewer).
    pub fn recent(&self, n: usize) -> &'a [Candle] {
        &self.candles[self.candles.len().saturating_sub(n)..]
    }
}

/// Trait for price-action matchers.
pub trait PatternMatcher: Send + Sync {
    fn method(&self) -> PriceActionMethod;

    fn min_candles(&self, config: &PriceActionConfig) -> usize;

    /// Patterns found, before compiling. Only called with enough candles.
    fn scan(&self, ctx: &PatternContext<'_>) -> PriceActionResult;

    /// Run the matcher, returning a degraded NO_SIGNAL when history is short.
    fn analyze(&self, ctx: &PatternContext<'_>) -> PriceActionResult {
        let needed = self.min_candles(ctx.config);
        if ctx.candles.len() < needed {
            debug!(
                method = %self.method(),
                needed,
                available = ctx.candles.len(),
                "price action skipped"
            );
            return PriceActionResult::degraded(
                self.method(),
                format!("{}: needed {needed} candles, have {}", self.method(), ctx.candles.len()),
            );
        }
        self.scan(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(direction: PatternDirection, confidence: f64) -> PatternMatch {
        PatternMatch::new(PatternKind::Marubozu, direction, confidence, "test")
    }

    #[test]
    fn majority_sums_confidence() {
        let result = PriceActionResult::compile(
            PriceActionMethod::BasicPatterns,
            vec![
                pattern(PatternDirection::Bullish, 60.0),
                pattern(PatternDirection::Bullish, 70.0),
                pattern(PatternDirection::Bearish, 75.0),
            ],
        );
        assert_eq!(result.signal, PriceActionSignal::Bullish);
        assert_eq!(result.confidence.value(), 100.0);
        assert_eq!(result.net_directional(), 1);
        assert!(!result.strong());
    }

    #[test]
    fn tie_is_neutral_forty() {
        let result = PriceActionResult::compile(
            PriceActionMethod::BasicPatterns,
            vec![pattern(PatternDirection::Neutral, 40.0)],
        );
        assert_eq!(result.signal, PriceActionSignal::Neutral);
        assert_eq!(result.confidence.value(), 40.0);
    }

    #[test]
    fn no_patterns_is_no_signal() {
        let result = PriceActionResult::compile(PriceActionMethod::BasicPatterns, Vec::new());
        assert_eq!(result.signal, PriceActionSignal::NoSignal);
        assert_eq!(result.confidence, Confidence::ZERO);
    }

    #[test]
    fn two_net_patterns_are_strong() {
        let result = PriceActionResult::compile(
            PriceActionMethod::BasicPatterns,
            vec![
                pattern(PatternDirection::Bearish, 30.0),
                pattern(PatternDirection::Bearish, 30.0),
                pattern(PatternDirection::Confirmation, 25.0),
            ],
        );
        assert_eq!(result.signal, PriceActionSignal::Bearish);
        assert_eq!(result.confidence.value(), 60.0);
        assert!(result.strong());
    }
}
