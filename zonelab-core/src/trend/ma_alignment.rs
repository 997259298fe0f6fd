//! MA alignment: three pairwise comparisons of the latest values.
//!
//! bullish score = #{fast > slow, close > trend, slow > trend}
//! bearish score = 3 − bullish score, so equal values count toward the bearish side.
//! A score of 2 gives MEDIUM, 3 gives STRONG. Confidence = min(40 + dominant/3 × 40, 85).

use super::{
    require_latest, ClassifyError, TrendAnalysis, TrendClassifier, TrendContext, TrendDetails,
    TrendMetrics,
};
use crate::config::TrendMethod;
use crate::domain::{Bias, Strength};
use crate::series::CandleSeries;

const METHOD: TrendMethod = TrendMethod::MaAlignment;

#[derive(Debug, Clone, Default)]
pub struct MaAlignment;

impl MaAlignment {
    pub fn new() -> Self {
        Self
    }

    /// Classify a single series. Reused per timeframe by the multi-timeframe method.
    pub fn classify_series(&self, series: &CandleSeries) -> Result<TrendAnalysis, ClassifyError> {
        series.require("MA_ALIGNMENT", self.min_history(series))?;
        let snap = series
            .snapshot()
            .ok_or_else(|| ClassifyError::Undefined {
                method: METHOD,
                reason: "empty series".into(),
            })?;
        let fast = require_latest(METHOD, "fast MA", snap.fast_ma)?;
        let slow = require_latest(METHOD, "slow MA", snap.slow_ma)?;
        let trend = require_latest(METHOD, "trend MA", snap.trend_ma)?;
        let close = snap.close;

        let bullish = [fast > slow, close > trend, slow > trend]
            .iter()
            .filter(|&&b| b)
            .count() as u8;
        let bearish = 3 - bullish;

        let strength_of = |score: u8| {
            if score == 3 {
                Strength::Strong
            } else {
                Strength::Medium
            }
        };
        let (bias, strength) = if bullish >= 2 {
            (Bias::Bullish, strength_of(bullish))
        } else if bearish >= 2 {
            (Bias::Bearish, strength_of(bearish))
        } else {
            (Bias::Neutral, Strength::Weak)
        };

        let dominant = bullish.max(bearish) as f64;
        let confidence = (40.0 + dominant / 3.0 * 40.0).min(85.0);

        Ok(TrendAnalysis::new(
            METHOD,
            bias,
            strength,
            confidence,
            TrendMetrics::from_series(series),
            TrendDetails::Alignment {
                bullish_score: bullish,
                bearish_score: bearish,
            },
        ))
    }
}

impl TrendClassifier for MaAlignment {
    fn method(&self) -> TrendMethod {
        METHOD
    }

    fn min_history(&self, series: &CandleSeries) -> usize {
        series.ma_config().trend_period
    }

    fn classify(&self, ctx: &TrendContext<'_>) -> Result<TrendAnalysis, ClassifyError> {
        self.classify_series(ctx.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Granularity;
    use crate::trend::test_support::*;

    #[test]
    fn uptrend_is_strong_bullish() {
        let series = series_from_closes(Granularity::D, &trending_closes(200, 100.0, 0.5));
        let result = MaAlignment::new().classify_series(&series).unwrap();
        assert_eq!(result.bias, Bias::Bullish);
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(result.confidence.value(), 80.0);
    }

    #[test]
    fn downtrend_is_strong_bearish_with_symmetric_confidence() {
        let series = series_from_closes(Granularity::D, &trending_closes(220, 300.0, -0.5));
        let result = MaAlignment::new().classify_series(&series).unwrap();
        assert_eq!(result.bias, Bias::Bearish);
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(result.confidence.value(), 80.0);
        assert_eq!(
            result.details,
            TrendDetails::Alignment {
                bullish_score: 0,
                bearish_score: 3
            }
        );
    }

    #[test]
    fn equal_moving_averages_score_bearish() {
        // Every MA of a constant 1.0 series is exactly 1.0.
        let series = series_from_closes(Granularity::D, &[1.0; 250]);
        let result = MaAlignment::new().classify_series(&series).unwrap();
        assert_eq!(result.bias, Bias::Bearish);
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(result.confidence.value(), 80.0);
        assert_eq!(
            result.details,
            TrendDetails::Alignment {
                bullish_score: 0,
                bearish_score: 3
            }
        );
    }

    #[test]
    fn one_bullish_comparison_is_medium_bearish() {
        // Rally at the end lifts close above the trend MA only.
        let mut closes = trending_closes(230, 300.0, -0.5);
        closes.push(300.0);
        let series = series_from_closes(Granularity::D, &closes);
        let result = MaAlignment::new().classify_series(&series).unwrap();
        assert_eq!(
            result.details,
            TrendDetails::Alignment {
                bullish_score: 1,
                bearish_score: 2
            }
        );
        assert_eq!(result.bias, Bias::Bearish);
        assert_eq!(result.strength, Strength::Medium);
    }

    #[test]
    fn short_series_is_insufficient() {
        let series = series_from_closes(Granularity::D, &trending_closes(150, 1.0, 0.01));
        assert!(matches!(
            MaAlignment::new().classify_series(&series),
            Err(ClassifyError::Insufficient(_))
        ));
    }
}
