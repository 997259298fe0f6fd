//! Momentum trend: a signed score from ROC, RSI and raw momentum.
//!
//! ROC: > strong → +2, > 0 → +1, < −strong → −2, < 0 → −1.
//! RSI: > bullish level → +1, < bearish level → −1.
//! Momentum: > threshold → +1, < −threshold → −1.
//! |score| ≥ 3 STRONG, 2 MEDIUM, 1 WEAK, 0 NEUTRAL. Confidence = min(|score| × 15 + 40, 90).

use super::{
    require_latest, ClassifyError, TrendAnalysis, TrendClassifier, TrendContext, TrendDetails,
    TrendMetrics,
};
use crate::config::{MomentumTrendConfig, TrendMethod};
use crate::domain::{Bias, Strength};
use crate::indicators::{latest, Indicator, Momentum, Roc, Rsi};
use crate::series::CandleSeries;

const METHOD: TrendMethod = TrendMethod::MomentumTrend;

#[derive(Debug, Clone)]
pub struct MomentumTrend {
    config: MomentumTrendConfig,
}

impl MomentumTrend {
    pub fn new(config: MomentumTrendConfig) -> Self {
        Self { config }
    }

    fn score(&self, roc: f64, rsi: f64, momentum: f64) -> i32 {
        let cfg = &self.config;
        let roc_score = if roc > cfg.roc_strong_threshold {
            2
        } else if roc > 0.0 {
            1
        } else if roc < -cfg.roc_strong_threshold {
            -2
        } else if roc < 0.0 {
            -1
        } else {
            0
        };
        let rsi_score = if rsi > cfg.rsi_bullish {
            1
        } else if rsi < cfg.rsi_bearish {
            -1
        } else {
            0
        };
        let momentum_score = if momentum > cfg.momentum_threshold {
            1
        } else if momentum < -cfg.momentum_threshold {
            -1
        } else {
            0
        };
        roc_score + rsi_score + momentum_score
    }
}

impl TrendClassifier for MomentumTrend {
    fn method(&self) -> TrendMethod {
        METHOD
    }

    fn min_history(&self, _series: &CandleSeries) -> usize {
        let cfg = &self.config;
        cfg.lookback
            .max(cfg.roc_period + 1)
            .max(cfg.rsi_period + 1)
            .max(cfg.momentum_period + 1)
    }

    fn classify(&self, ctx: &TrendContext<'_>) -> Result<TrendAnalysis, ClassifyError> {
        let series = ctx.primary;
        series.require("MOMENTUM_TREND", self.min_history(series))?;

        let cfg = &self.config;
        let candles = series.candles();
        let roc = require_latest(METHOD, "ROC", latest(&Roc::new(cfg.roc_period).compute(candles)))?;
        let rsi = require_latest(METHOD, "RSI", latest(&Rsi::new(cfg.rsi_period).compute(candles)))?;
        let momentum = require_latest(
            METHOD,
            "momentum",
            latest(&Momentum::new(cfg.momentum_period).compute(candles)),
        )?;

        let score = self.score(roc, rsi, momentum);
        let bias = match score {
            s if s > 0 => Bias::Bullish,
            s if s < 0 => Bias::Bearish,
            _ => Bias::Neutral,
        };
        let strength = match score.abs() {
            0 | 1 => Strength::Weak,
            2 => Strength::Medium,
            _ => Strength::Strong,
        };
        let confidence = (score.abs() as f64 * 15.0 + 40.0).min(90.0);

        Ok(TrendAnalysis::new(
            METHOD,
            bias,
            strength,
            confidence,
            TrendMetrics::from_series(series),
            TrendDetails::Momentum {
                roc: Some(roc),
                rsi: Some(rsi),
                momentum: Some(momentum),
                score,
            },
        ))
    }
}
