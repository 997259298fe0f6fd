//! Entry timing: decide whether the latest execution candle is a good moment
//! to act on a zone.
//!
//! Each method returns an [`EntryDecision`]; a method that finds nothing, or
//! does not have enough candles, returns NO_ENTRY at confidence 0.

pub mod breakout_retest;
pub mod confluence;
pub mod immediate;
pub mod pullback;
pub mod zone_rejection;

pub use breakout_retest::BreakoutRetest;
pub use confluence::{Confirmation, ConfluenceConfirmation};
pub use immediate::Immediate;
pub use pullback::PullbackCompletion;
pub use zone_rejection::ZoneRejection;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::{EntryConfig, EntryMethod};
use crate::domain::{Candle, Confidence, Direction};
use crate::zones::{Zone, ZoneName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Entry,
    NoEntry,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Entry => "ENTRY",
            Self::NoEntry => "NO_ENTRY",
        })
    }
}

/// Measurements behind a firing decision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDetails {
    #[default]
    None,
    Rejection {
        wick_strength: f64,
        bounce_distance: f64,
    },
    Pullback {
        extreme: f64,
        recovery_strength: f64,
    },
    BreakoutRetest {
        break_close: f64,
        bars_since_break: usize,
        hold_ratio: f64,
    },
    Confluence {
        confirmations: Vec<Confirmation>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDecision {
    pub method: EntryMethod,
    pub signal: EntryStatus,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub reason: String,
    #[serde(default)]
    pub details: EntryDetails,
}

impl EntryDecision {
    pub fn no_entry(method: EntryMethod, reason: impl Into<String>) -> Self {
        Self {
            method,
            signal: EntryStatus::NoEntry,
            confidence: Confidence::ZERO,
            zone: None,
            direction: None,
            reason: reason.into(),
            details: EntryDetails::None,
        }
    }

    pub fn entry(method: EntryMethod, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            method,
            signal: EntryStatus::Entry,
            confidence: Confidence::new(confidence),
            zone: None,
            direction: None,
            reason: reason.into(),
            details: EntryDetails::None,
        }
    }

    pub fn with_zone(mut self, zone: ZoneName) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_direction(mut self, direction: Option<Direction>) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_details(mut self, details: EntryDetails) -> Self {
        self.details = details;
        self
    }

    pub fn fires(&self) -> bool {
        self.signal == EntryStatus::Entry
    }
}

/// Inputs to an entry timing method.
#[derive(Debug, Clone, Copy)]
pub struct EntryContext<'a> {
    /// Execution-timeframe candles, oldest first.
    pub candles: &'a [Candle],
    pub zones: &'a [Zone],
    pub config: &'a EntryConfig,
}

impl<'a> EntryContext<'a> {
    pub fn recent(&self, n: usize) -> &'a [Candle] {
        &self.candles[self.candles.len().saturating_sub(n)..]
    }
}

/// Trait for entry timing methods.
pub trait EntryTiming: Send + Sync {
    fn method(&self) -> EntryMethod;

    fn min_candles(&self, config: &EntryConfig) -> usize;

    /// Look for an entry. Only called with enough candles.
    fn detect(&self, ctx: &EntryContext<'_>) -> EntryDecision;

    fn evaluate(&self, ctx: &EntryContext<'_>) -> EntryDecision {
        let needed = self.min_candles(ctx.config);
        if ctx.candles.len() < needed {
            debug!(method = %self.method(), needed, available = ctx.candles.len(), "entry timing skipped");
            return EntryDecision::no_entry(
                self.method(),
                format!("needed {needed} candles, have {}", ctx.candles.len()),
            );
        }
        self.detect(ctx)
    }
}
