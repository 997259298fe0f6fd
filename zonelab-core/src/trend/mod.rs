//! Trend classification.
//!
//! Six methods implement [`TrendClassifier`]. A classifier returns
//! `Err(ClassifyError)` when it cannot run; [`analyze_trend`] turns that into
//! the documented neutral result (NEUTRAL / WEAK / 30, flagged degraded) so the
//! pipeline always carries a complete `TrendAnalysis`.

pub mod composite;
pub mod ma_alignment;
pub mod market_structure;
pub mod momentum;
pub mod multi_timeframe;
pub mod slope;

pub use composite::CompositeTrend;
pub use ma_alignment::MaAlignment;
pub use market_structure::{MarketStructure, SwingPoint};
pub use momentum::MomentumTrend;
pub use multi_timeframe::{MultiTimeframe, TimeframeVote};
pub use slope::SlopeAnalysis;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use crate::config::TrendMethod;
use crate::domain::{Bias, Confidence, Granularity, Strength};
use crate::indicators::IndicatorError;
use crate::series::CandleSeries;

/// Confidence of the neutral result returned for insufficient history.
pub const DEGRADED_CONFIDENCE: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Insufficient(#[from] IndicatorError),
    #[error("{method}: {reason}")]
    Undefined { method: TrendMethod, reason: String },
}

/// Inputs to a classifier: the primary series plus every timeframe available
/// for multi-timeframe voting.
#[derive(Debug, Clone, Copy)]
pub struct TrendContext<'a> {
    pub primary: &'a CandleSeries,
    pub timeframes: &'a BTreeMap<Granularity, CandleSeries>,
}

impl<'a> TrendContext<'a> {
    pub fn new(
        primary: &'a CandleSeries,
        timeframes: &'a BTreeMap<Granularity, CandleSeries>,
    ) -> Self {
        Self {
            primary,
            timeframes,
        }
    }
}

/// ATR-normalised context carried by every trend result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendMetrics {
    /// |fast − slow| / ATR, 0 when ATR is unavailable.
    pub ma_separation: f64,
    /// |close − trend MA| / ATR, 0 when ATR is unavailable.
    pub price_trend_separation: f64,
    pub current_price: Option<f64>,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub trend_ma: Option<f64>,
    pub atr: Option<f64>,
}

impl TrendMetrics {
    pub fn from_series(series: &CandleSeries) -> Self {
        let Some(snap) = series.snapshot() else {
            return Self::default();
        };
        let normalise = |a: Option<f64>, b: Option<f64>| match (a, b, snap.atr) {
            (Some(a), Some(b), Some(atr)) if atr > 0.0 => (a - b).abs() / atr,
            _ => 0.0,
        };
        Self {
            ma_separation: normalise(snap.fast_ma, snap.slow_ma),
            price_trend_separation: normalise(Some(snap.close), snap.trend_ma),
            current_price: Some(snap.close),
            fast_ma: snap.fast_ma,
            slow_ma: snap.slow_ma,
            trend_ma: snap.trend_ma,
            atr: snap.atr,
        }
    }
}

/// Method-specific evidence behind a trend result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendDetails {
    #[default]
    None,
    Alignment {
        bullish_score: u8,
        bearish_score: u8,
    },
    Slopes {
        fast_ma: f64,
        slow_ma: f64,
        trend_ma: f64,
        price: f64,
        bullish: usize,
        bearish: usize,
    },
    Structure {
        swing_highs: Vec<SwingPoint>,
        swing_lows: Vec<SwingPoint>,
        higher_highs: bool,
        higher_lows: bool,
        lower_highs: bool,
        lower_lows: bool,
    },
    Momentum {
        roc: Option<f64>,
        rsi: Option<f64>,
        momentum: Option<f64>,
        score: i32,
    },
    MultiTimeframe {
        votes: Vec<TimeframeVote>,
        weighted_score: f64,
    },
    Composite {
        components: Vec<TrendAnalysis>,
        bullish_votes: usize,
        bearish_votes: usize,
        neutral_votes: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub method: TrendMethod,
    pub bias: Bias,
    pub strength: Strength,
    pub confidence: Confidence,
    /// Why the method fell back to the neutral result, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
    pub metrics: TrendMetrics,
    pub details: TrendDetails,
}

impl TrendAnalysis {
    pub fn new(
        method: TrendMethod,
        bias: Bias,
        strength: Strength,
        confidence: f64,
        metrics: TrendMetrics,
        details: TrendDetails,
    ) -> Self {
        Self {
            method,
            bias,
            strength,
            confidence: Confidence::new(confidence),
            degraded: None,
            metrics,
            details,
        }
    }

    /// NEUTRAL / WEAK / 30 with the reason attached.
    pub fn degraded(method: TrendMethod, metrics: TrendMetrics, reason: impl Into<String>) -> Self {
        Self {
            method,
            bias: Bias::Neutral,
            strength: Strength::Weak,
            confidence: Confidence::new(DEGRADED_CONFIDENCE),
            degraded: Some(reason.into()),
            metrics,
            details: TrendDetails::None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Trait for trend classifiers.
pub trait TrendClassifier: Send + Sync {
    fn method(&self) -> TrendMethod;

    /// Candles the primary series needs before `classify` can succeed.
    fn min_history(&self, series: &CandleSeries) -> usize;

    fn classify(&self, ctx: &TrendContext<'_>) -> Result<TrendAnalysis, ClassifyError>;
}

/// Run a classifier, substituting the degraded neutral result on error.
pub fn analyze_trend(classifier: &dyn TrendClassifier, ctx: &TrendContext<'_>) -> TrendAnalysis {
    match classifier.classify(ctx) {
        Ok(analysis) => analysis,
        Err(err) => {
            warn!(
                method = %classifier.method(),
                instrument = ctx.primary.instrument(),
                error = %err,
                "trend classification degraded"
            );
            TrendAnalysis::degraded(
                classifier.method(),
                TrendMetrics::from_series(ctx.primary),
                err.to_string(),
            )
        }
    }
}

/// Latest value of a derived column or an `Undefined` error naming it.
pub(crate) fn require_latest(
    method: TrendMethod,
    column: &str,
    value: Option<f64>,
) -> Result<f64, ClassifyError> {
    value.ok_or_else(|| ClassifyError::Undefined {
        method,
        reason: format!("{column} is undefined at the latest candle"),
    })
}
