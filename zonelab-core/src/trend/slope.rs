//! Slope analysis: least-squares slopes of the three MAs and of price,
//! each divided by the latest ATR.
//!
//! A slope above +threshold is bullish, below −threshold bearish. Three or more
//! agreeing slopes set the bias (four → STRONG). Confidence = min(40 + dominant × 15, 90).
//! With ATR undefined or zero every normalised slope is 0 and the result is neutral.

use super::{ClassifyError, TrendAnalysis, TrendClassifier, TrendContext, TrendDetails, TrendMetrics};
use crate::config::{SlopeConfig, TrendMethod};
use crate::domain::{Bias, Strength};
use crate::indicators::{closes, last_defined, latest, linear_fit, IndicatorError};
use crate::series::CandleSeries;

const METHOD: TrendMethod = TrendMethod::SlopeAnalysis;

#[derive(Debug, Clone)]
pub struct SlopeAnalysis {
    config: SlopeConfig,
}

impl SlopeAnalysis {
    pub fn new(config: SlopeConfig) -> Self {
        Self { config }
    }

    /// Raw slope over the last `period` defined values of a column.
    fn slope(&self, column: &str, values: &[Option<f64>], period: usize) -> Result<f64, ClassifyError> {
        let tail = last_defined(values, period);
        if tail.len() < period.max(2) {
            return Err(ClassifyError::Insufficient(IndicatorError::InsufficientData {
                indicator: format!("slope of {column}"),
                needed: period.max(2),
                available: tail.len(),
            }));
        }
        Ok(linear_fit(&tail).map_or(0.0, |fit| fit.slope))
    }
}

impl TrendClassifier for SlopeAnalysis {
    fn method(&self) -> TrendMethod {
        METHOD
    }

    fn min_history(&self, series: &CandleSeries) -> usize {
        let trend_slope_history = series.ma_config().trend_period + self.config.trend_period - 1;
        self.config.lookback.max(trend_slope_history)
    }

    fn classify(&self, ctx: &TrendContext<'_>) -> Result<TrendAnalysis, ClassifyError> {
        let series = ctx.primary;
        series.require("SLOPE_ANALYSIS", self.min_history(series))?;

        let cfg = &self.config;
        let price: Vec<Option<f64>> = closes(series.candles()).into_iter().map(Some).collect();
        let raw = [
            self.slope("fast MA", series.fast_ma(), cfg.fast_period)?,
            self.slope("slow MA", series.slow_ma(), cfg.slow_period)?,
            self.slope("trend MA", series.trend_ma(), cfg.trend_period)?,
            self.slope("close", &price, cfg.price_period)?,
        ];

        let normalised = match latest(series.atr()) {
            Some(atr) if atr > 0.0 => raw.map(|s| s / atr),
            _ => [0.0; 4],
        };

        let bullish = normalised.iter().filter(|&&s| s > cfg.threshold).count();
        let bearish = normalised.iter().filter(|&&s| s < -cfg.threshold).count();

        let (bias, strength) = if bullish >= 3 {
            (Bias::Bullish, if bullish == 4 { Strength::Strong } else { Strength::Medium })
        } else if bearish >= 3 {
            (Bias::Bearish, if bearish == 4 { Strength::Strong } else { Strength::Medium })
        } else {
            (Bias::Neutral, Strength::Weak)
        };
        let confidence = (40.0 + bullish.max(bearish) as f64 * 15.0).min(90.0);

        let [fast_ma, slow_ma, trend_ma, price] = normalised;
        Ok(TrendAnalysis::new(
            METHOD,
            bias,
            strength,
            confidence,
            TrendMetrics::from_series(series),
            TrendDetails::Slopes {
                fast_ma,
                slow_ma,
                trend_ma,
                price,
                bullish,
                bearish,
            },
        ))
    }
}
