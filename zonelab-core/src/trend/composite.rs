//! Composite trend: majority vote of MA alignment, slope analysis and momentum,
//! plus multi-timeframe when more than one timeframe is supplied.
//!
//! Components that fail are skipped. The side with more directional votes wins,
//! then the side with the larger summed confidence; a full tie is NEUTRAL / WEAK / 40.
//! Three or more winning votes → STRONG, else MEDIUM. Confidence is the mean of the
//! winning votes, capped at 95.

use tracing::warn;

use super::{
    ClassifyError, MaAlignment, MomentumTrend, MultiTimeframe, SlopeAnalysis, TrendAnalysis,
    TrendClassifier, TrendContext, TrendDetails, TrendMetrics,
};
use crate::config::{TrendConfig, TrendMethod};
use crate::domain::{Bias, Strength};
use crate::series::CandleSeries;

const METHOD: TrendMethod = TrendMethod::CompositeTrend;

pub struct CompositeTrend {
    components: Vec<Box<dyn TrendClassifier>>,
    multi_timeframe: MultiTimeframe,
}

impl CompositeTrend {
    pub fn new(config: &TrendConfig) -> Self {
        Self {
            components: vec![
                Box::new(MaAlignment::new()),
                Box::new(SlopeAnalysis::new(config.slope.clone())),
                Box::new(MomentumTrend::new(config.momentum.clone())),
            ],
            multi_timeframe: MultiTimeframe::new(config.multi_timeframe.clone()),
        }
    }

    fn active<'a>(&'a self, ctx: &TrendContext<'_>) -> Vec<&'a dyn TrendClassifier> {
        let mut active: Vec<&dyn TrendClassifier> = self.components.iter().map(|c| c.as_ref()).collect();
        if ctx.timeframes.len() > 1 {
            active.push(&self.multi_timeframe);
        }
        active
    }
}

impl TrendClassifier for CompositeTrend {
    fn method(&self) -> TrendMethod {
        METHOD
    }

    /// The shortest history any component accepts.
    fn min_history(&self, series: &CandleSeries) -> usize {
        self.components
            .iter()
            .map(|c| c.min_history(series))
            .min()
            .unwrap_or(0)
    }

    fn classify(&self, ctx: &TrendContext<'_>) -> Result<TrendAnalysis, ClassifyError> {
        let mut components = Vec::new();
        let mut first_error = None;
        for classifier in self.active(ctx) {
            match classifier.classify(ctx) {
                Ok(analysis) => components.push(analysis),
                Err(err) => {
                    warn!(
                        component = %classifier.method(),
                        instrument = ctx.primary.instrument(),
                        error = %err,
                        "composite trend component skipped"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }
        if components.is_empty() {
            return Err(first_error.unwrap_or_else(|| ClassifyError::Undefined {
                method: METHOD,
                reason: "no components configured".into(),
            }));
        }

        let tally = |bias: Bias| {
            let votes: Vec<f64> = components
                .iter()
                .filter(|c| c.bias == bias)
                .map(|c| c.confidence.value())
                .collect();
            votes
        };
        let bullish = tally(Bias::Bullish);
        let bearish = tally(Bias::Bearish);
        let neutral_votes = components.len() - bullish.len() - bearish.len();

        let bull_sum: f64 = bullish.iter().sum();
        let bear_sum: f64 = bearish.iter().sum();
        let winner = match bullish.len().cmp(&bearish.len()) {
            std::cmp::Ordering::Greater => Some((Bias::Bullish, &bullish)),
            std::cmp::Ordering::Less => Some((Bias::Bearish, &bearish)),
            std::cmp::Ordering::Equal if bull_sum > bear_sum => Some((Bias::Bullish, &bullish)),
            std::cmp::Ordering::Equal if bear_sum > bull_sum => Some((Bias::Bearish, &bearish)),
            std::cmp::Ordering::Equal => None,
        };

        let (bias, strength, confidence) = match winner {
            Some((bias, votes)) => {
                let strength = if votes.len() >= 3 {
                    Strength::Strong
                } else {
                    Strength::Medium
                };
                let mean = votes.iter().sum::<f64>() / votes.len() as f64;
                (bias, strength, mean.min(95.0))
            }
            None => (Bias::Neutral, Strength::Weak, 40.0),
        };

        let bullish_votes = bullish.len();
        let bearish_votes = bearish.len();
        Ok(TrendAnalysis::new(
            METHOD,
            bias,
            strength,
            confidence,
            TrendMetrics::from_series(ctx.primary),
            TrendDetails::Composite {
                components,
                bullish_votes,
                bearish_votes,
                neutral_votes,
            },
        ))
    }
}
