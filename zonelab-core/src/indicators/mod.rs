//! Indicator engine.
//!
//! Every indicator implements [`Indicator`]: candle history in, a series of the
//! same length out. Warm-up entries are `None` rather than a NaN sentinel, so an
//! undefined value can never leak silently into a downstream score.
//!
//! Indicators are causal: the value at index t depends only on candles `..=t`.

pub mod atr;
pub mod ema;
pub mod momentum;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod volume;

pub use atr::{true_range, Atr};
pub use ema::{ema_of_series, Ema};
pub use momentum::Momentum;
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::{sma_of_series, Sma};
pub use stats::{linear_fit, mean, quantile, LinearFit};
pub use volume::{volume_profile, VolumeProfile};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Candle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("{indicator}: insufficient data (needed {needed} candles, got {available})")]
    InsufficientData {
        indicator: String,
        needed: usize,
        available: usize,
    },
}

/// Trait for indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_21", "atr_14").
    fn name(&self) -> &str;

    /// Number of candles before the first defined output.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole candle slice.
    ///
    /// Returns a vector of the same length as `candles`; the first `lookback()`
    /// entries are `None`.
    fn compute(&self, candles: &[Candle]) -> Vec<Option<f64>>;

    /// Like [`Indicator::compute`] but fails when the history cannot produce a
    /// single defined value.
    fn compute_checked(&self, candles: &[Candle]) -> Result<Vec<Option<f64>>, IndicatorError> {
        let needed = self.lookback() + 1;
        if candles.len() < needed {
            return Err(IndicatorError::InsufficientData {
                indicator: self.name().to_string(),
                needed,
                available: candles.len(),
            });
        }
        Ok(self.compute(candles))
    }
}

/// Moving-average flavour used for the fast/slow/trend columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaKind {
    #[default]
    Ema,
    Sma,
}

impl MaKind {
    pub fn build(self, period: usize) -> Box<dyn Indicator> {
        match self {
            Self::Ema => Box::new(Ema::new(period)),
            Self::Sma => Box::new(Sma::new(period)),
        }
    }
}

/// Close prices of a candle slice.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// The last `n` defined values of a derived column, oldest first.
pub fn last_defined(values: &[Option<f64>], n: usize) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().rev().flatten().take(n).copied().collect();
    out.reverse();
    out
}

/// Latest entry of a derived column, if defined.
pub fn latest(values: &[Option<f64>]) -> Option<f64> {
    values.last().copied().flatten()
}

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle), high/low one unit
/// outside the body, hourly timestamps, volume 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_checked_reports_shortfall() {
        let candles = make_candles(&[1.0, 2.0]);
        let err = Sma::new(5).compute_checked(&candles).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                indicator: "sma_5".into(),
                needed: 5,
                available: 2,
            }
        );
        assert!(Sma::new(2).compute_checked(&candles).is_ok());
    }

    #[test]
    fn last_defined_skips_warmup() {
        let values = vec![None, None, Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(last_defined(&values, 2), vec![2.0, 3.0]);
        assert_eq!(last_defined(&values, 10), vec![1.0, 2.0, 3.0]);
        assert_eq!(latest(&values), Some(3.0));
        assert_eq!(latest(&[]), None);
    }

    #[test]
    fn ma_kind_builds_named_indicator() {
        assert_eq!(MaKind::Ema.build(21).name(), "ema_21");
        assert_eq!(MaKind::Sma.build(50).name(), "sma_50");
    }
}
