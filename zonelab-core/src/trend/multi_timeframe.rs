//! Multi-timeframe: MA alignment per timeframe, combined by weighted vote.
//!
//! score = Σ sign(bias) × weight × confidence/100 / Σ weight
//! score > bullish threshold → BULLISH, < bearish threshold → BEARISH,
//! |score| > strong threshold → STRONG. Confidence = min(|score| × 100 + 40, 95).
//! A timeframe that cannot be classified votes neutral but keeps its weight.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    ClassifyError, MaAlignment, TrendAnalysis, TrendClassifier, TrendContext, TrendDetails,
    TrendMetrics,
};
use crate::config::{MultiTimeframeConfig, TrendMethod};
use crate::domain::{Bias, Confidence, Granularity, Strength};
use crate::series::CandleSeries;

const METHOD: TrendMethod = TrendMethod::MultiTimeframe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeVote {
    pub granularity: Granularity,
    pub bias: Bias,
    pub confidence: Confidence,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MultiTimeframe {
    config: MultiTimeframeConfig,
    alignment: MaAlignment,
}

impl MultiTimeframe {
    pub fn new(config: MultiTimeframeConfig) -> Self {
        Self {
            config,
            alignment: MaAlignment::new(),
        }
    }

    fn vote(&self, granularity: Granularity, series: &CandleSeries) -> TimeframeVote {
        let weight = self.config.weight(granularity);
        match self.alignment.classify_series(series) {
            Ok(analysis) => TimeframeVote {
                granularity,
                bias: analysis.bias,
                confidence: analysis.confidence,
                weight,
                degraded: None,
            },
            Err(err) => {
                debug!(%granularity, error = %err, "timeframe votes neutral");
                TimeframeVote {
                    granularity,
                    bias: Bias::Neutral,
                    confidence: Confidence::ZERO,
                    weight,
                    degraded: Some(err.to_string()),
                }
            }
        }
    }
}

/// Weighted score of a set of votes; 0 when the total weight is 0.
pub fn weighted_score(votes: &[TimeframeVote]) -> f64 {
    let total: f64 = votes.iter().map(|v| v.weight).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let sum: f64 = votes
        .iter()
        .map(|v| {
            let sign = v.bias.direction().map_or(0.0, |d| d.sign());
            sign * v.weight * v.confidence.value() / 100.0
        })
        .sum();
    sum / total
}

impl TrendClassifier for MultiTimeframe {
    fn method(&self) -> TrendMethod {
        METHOD
    }

    fn min_history(&self, series: &CandleSeries) -> usize {
        self.alignment.min_history(series)
    }

    fn classify(&self, ctx: &TrendContext<'_>) -> Result<TrendAnalysis, ClassifyError> {
        if ctx.timeframes.is_empty() {
            let mut fallback = self.alignment.classify_series(ctx.primary)?;
            fallback.method = METHOD;
            return Ok(fallback);
        }

        let votes: Vec<TimeframeVote> = ctx
            .timeframes
            .iter()
            .map(|(&granularity, series)| self.vote(granularity, series))
            .collect();
        let score = weighted_score(&votes);

        let cfg = &self.config;
        let strength_of = |score: f64| {
            if score.abs() > cfg.strong_threshold {
                Strength::Strong
            } else {
                Strength::Medium
            }
        };
        let (bias, strength) = if score > cfg.bullish_threshold {
            (Bias::Bullish, strength_of(score))
        } else if score < cfg.bearish_threshold {
            (Bias::Bearish, strength_of(score))
        } else {
            (Bias::Neutral, Strength::Weak)
        };
        let confidence = (score.abs() * 100.0 + 40.0).min(95.0);

        Ok(TrendAnalysis::new(
            METHOD,
            bias,
            strength,
            confidence,
            TrendMetrics::from_series(ctx.primary),
            TrendDetails::MultiTimeframe {
                votes,
                weighted_score: score,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use crate::trend::test_support::*;
    use std::collections::BTreeMap;

    fn up(g: Granularity) -> CandleSeries {
        series_from_closes(g, &trending_closes(220, 100.0, 0.5))
    }

    fn down(g: Granularity) -> CandleSeries {
        series_from_closes(g, &trending_closes(220, 300.0, -0.5))
    }

    fn classify(timeframes: BTreeMap<Granularity, CandleSeries>) -> TrendAnalysis {
        let primary = up(Granularity::D);
        MultiTimeframe::new(MultiTimeframeConfig::default())
            .classify(&TrendContext::new(&primary, &timeframes))
            .unwrap()
    }

    #[test]
    fn unanimous_uptrend_is_strong() {
        let timeframes = BTreeMap::from([
            (Granularity::D, up(Granularity::D)),
            (Granularity::H4, up(Granularity::H4)),
            (Granularity::H1, up(Granularity::H1)),
        ]);
        let result = classify(timeframes);
        assert_eq!(result.bias, Bias::Bullish);
        assert_eq!(result.strength, Strength::Strong);
        assert_eq!(result.confidence.value(), 95.0);
    }

    #[test]
    fn balanced_votes_are_neutral() {
        let timeframes = BTreeMap::from([
            (Granularity::D, up(Granularity::D)),
            (Granularity::H4, down(Granularity::H4)),
            (Granularity::H1, down(Granularity::H1)),
        ]);
        let result = classify(timeframes);
        assert_eq!(result.bias, Bias::Neutral);
        assert_eq!(result.strength, Strength::Weak);
        assert_approx(result.confidence.value(), 40.0, DEFAULT_EPSILON);
    }

    #[test]
    fn failed_timeframe_keeps_its_weight() {
        let short = series_from_closes(Granularity::D, &trending_closes(20, 100.0, 0.5));
        let timeframes = BTreeMap::from([
            (Granularity::D, short),
            (Granularity::H4, up(Granularity::H4)),
            (Granularity::H1, up(Granularity::H1)),
        ]);
        let result = classify(timeframes);
        let TrendDetails::MultiTimeframe { votes, weighted_score } = &result.details else {
            panic!("expected multi-timeframe details");
        };
        let daily = votes.iter().find(|v| v.granularity == Granularity::D).unwrap();
        assert!(daily.degraded.is_some());
        assert_eq!(daily.bias, Bias::Neutral);
        assert_approx(*weighted_score, (2.0 * 0.8 + 0.8) / 6.0, DEFAULT_EPSILON);
        assert_eq!(result.bias, Bias::Bullish);
        assert_eq!(result.strength, Strength::Medium);
    }

    #[test]
    fn no_timeframes_falls_back_to_primary_alignment() {
        let result = classify(BTreeMap::new());
        assert_eq!(result.method, TrendMethod::MultiTimeframe);
        assert_eq!(result.bias, Bias::Bullish);
        assert!(matches!(result.details, TrendDetails::Alignment { .. }));
    }
}
