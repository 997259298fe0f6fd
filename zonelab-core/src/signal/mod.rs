//! Signal synthesis: fold every stage's output into one graded recommendation.
//!
//! ```text
//! score = price action (STRONG 40 | plain 20)
//!       + 15 × active fast/slow MA zones
//!       + trend (aligned: STRONG 25 | other 15, counter −20, neutral 0)
//!       + volume spike 10
//!
//! ≥70 STRONG_x   ≥50 x   ≥30 WEAK_x   else NO_SIGNAL
//! ```

pub mod risk;
pub mod synthesizer;

pub use risk::{RiskError, RiskReward};
pub use synthesizer::{synthesize, SignalInputs};

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{Confidence, Direction};
use crate::zones::ZoneName;

/// Graded recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    NoSignal,
    StrongBullish,
    Bullish,
    WeakBullish,
    StrongBearish,
    Bearish,
    WeakBearish,
}

impl SignalKind {
    pub const STRONG_THRESHOLD: i32 = 70;
    pub const PLAIN_THRESHOLD: i32 = 50;
    pub const WEAK_THRESHOLD: i32 = 30;

    /// Grade a score for a direction.
    pub fn from_score(direction: Direction, score: i32) -> Self {
        use Direction::*;
        match (direction, score) {
            (Bullish, s) if s >= Self::STRONG_THRESHOLD => Self::StrongBullish,
            (Bullish, s) if s >= Self::PLAIN_THRESHOLD => Self::Bullish,
            (Bullish, s) if s >= Self::WEAK_THRESHOLD => Self::WeakBullish,
            (Bearish, s) if s >= Self::STRONG_THRESHOLD => Self::StrongBearish,
            (Bearish, s) if s >= Self::PLAIN_THRESHOLD => Self::Bearish,
            (Bearish, s) if s >= Self::WEAK_THRESHOLD => Self::WeakBearish,
            _ => Self::NoSignal,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::StrongBullish | Self::Bullish | Self::WeakBullish => Some(Direction::Bullish),
            Self::StrongBearish | Self::Bearish | Self::WeakBearish => Some(Direction::Bearish),
            Self::NoSignal => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSignal => "NO_SIGNAL",
            Self::StrongBullish => "STRONG_BULLISH",
            Self::Bullish => "BULLISH",
            Self::WeakBullish => "WEAK_BULLISH",
            Self::StrongBearish => "STRONG_BEARISH",
            Self::Bearish => "BEARISH",
            Self::WeakBearish => "WEAK_BEARISH",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points contributed by each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub price_action: i32,
    pub zones: i32,
    pub trend: i32,
    pub volume: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.price_action + self.zones + self.trend + self.volume
    }
}

/// The pipeline's final recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySignal {
    pub signal: SignalKind,
    pub confidence: Confidence,
    /// Latest execution close; absent only when no price was available.
    pub entry_price: Option<f64>,
    pub active_zones: BTreeSet<ZoneName>,
    pub trend_alignment: bool,
    pub risk_reward: Option<RiskReward>,
    pub score: ScoreBreakdown,
    /// Why a scored direction was withheld.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppressed: Option<String>,
}

impl EntrySignal {
    pub fn no_signal(entry_price: Option<f64>) -> Self {
        Self {
            signal: SignalKind::NoSignal,
            confidence: Confidence::ZERO,
            entry_price,
            active_zones: BTreeSet::new(),
            trend_alignment: false,
            risk_reward: None,
            score: ScoreBreakdown::default(),
            suppressed: None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.signal.direction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_by_threshold() {
        assert_eq!(SignalKind::from_score(Direction::Bullish, 70), SignalKind::StrongBullish);
        assert_eq!(SignalKind::from_score(Direction::Bullish, 69), SignalKind::Bullish);
        assert_eq!(SignalKind::from_score(Direction::Bearish, 50), SignalKind::Bearish);
        assert_eq!(SignalKind::from_score(Direction::Bearish, 30), SignalKind::WeakBearish);
        assert_eq!(SignalKind::from_score(Direction::Bearish, 29), SignalKind::NoSignal);
        assert_eq!(SignalKind::from_score(Direction::Bullish, -20), SignalKind::NoSignal);
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&SignalKind::StrongBullish).unwrap(), "\"STRONG_BULLISH\"");
        assert_eq!(serde_json::to_string(&SignalKind::NoSignal).unwrap(), "\"NO_SIGNAL\"");
        assert_eq!(SignalKind::WeakBearish.to_string(), "WEAK_BEARISH");
    }

    #[test]
    fn direction_of_kind() {
        assert_eq!(SignalKind::WeakBullish.direction(), Some(Direction::Bullish));
        assert_eq!(SignalKind::StrongBearish.direction(), Some(Direction::Bearish));
        assert_eq!(SignalKind::NoSignal.direction(), None);
    }
}
