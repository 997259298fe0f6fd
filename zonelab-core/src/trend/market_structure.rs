//! Market structure: compare the two most recent swing highs and swing lows.
//!
//! A swing high is a candle whose high equals the maximum of the window
//! `[i − p, i + p]` (lows symmetric), so the last `p` candles can never be swings.
//! A flat top or bottom inside one window counts once.

use serde::{Deserialize, Serialize};

use super::{ClassifyError, TrendAnalysis, TrendClassifier, TrendContext, TrendDetails, TrendMetrics};
use crate::config::{StructureConfig, TrendMethod};
use crate::domain::{Bias, Strength};
use crate::series::CandleSeries;

const METHOD: TrendMethod = TrendMethod::MarketStructure;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingKind {
    High,
    Low,
}

/// Swing points of `values` with half-window `period`, keeping the last `max_points`.
pub fn swing_points(values: &[f64], period: usize, kind: SwingKind, max_points: usize) -> Vec<SwingPoint> {
    let n = values.len();
    if period == 0 || n < period * 2 + 1 {
        return Vec::new();
    }

    let mut swings: Vec<SwingPoint> = Vec::new();
    for i in period..n - period {
        let window = &values[i - period..=i + period];
        let extreme = match kind {
            SwingKind::High => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            SwingKind::Low => window.iter().copied().fold(f64::INFINITY, f64::min),
        };
        if values[i] != extreme {
            continue;
        }
        let plateau = swings
            .last()
            .is_some_and(|prev| prev.price == values[i] && i - prev.index <= period);
        if !plateau {
            swings.push(SwingPoint {
                index: i,
                price: values[i],
            });
        }
    }

    if swings.len() > max_points {
        swings.drain(..swings.len() - max_points);
    }
    swings
}

#[derive(Debug, Clone)]
pub struct MarketStructure {
    config: StructureConfig,
}

impl MarketStructure {
    pub fn new(config: StructureConfig) -> Self {
        Self { config }
    }
}

impl TrendClassifier for MarketStructure {
    fn method(&self) -> TrendMethod {
        METHOD
    }

    fn min_history(&self, _series: &CandleSeries) -> usize {
        self.config.lookback
    }

    fn classify(&self, ctx: &TrendContext<'_>) -> Result<TrendAnalysis, ClassifyError> {
        let series = ctx.primary;
        series.require("MARKET_STRUCTURE", self.min_history(series))?;

        let cfg = &self.config;
        let highs: Vec<f64> = series.candles().iter().map(|c| c.high).collect();
        let lows: Vec<f64> = series.candles().iter().map(|c| c.low).collect();
        let swing_highs = swing_points(&highs, cfg.swing_period, SwingKind::High, cfg.max_swings);
        let swing_lows = swing_points(&lows, cfg.swing_period, SwingKind::Low, cfg.max_swings);

        let metrics = TrendMetrics::from_series(series);
        if swing_highs.len() < 2 || swing_lows.len() < 2 {
            return Ok(TrendAnalysis::new(
                METHOD,
                Bias::Neutral,
                Strength::Weak,
                30.0,
                metrics,
                TrendDetails::Structure {
                    swing_highs,
                    swing_lows,
                    higher_highs: false,
                    higher_lows: false,
                    lower_highs: false,
                    lower_lows: false,
                },
            ));
        }

        let (prev_high, last_high) = last_pair(&swing_highs);
        let (prev_low, last_low) = last_pair(&swing_lows);
        let higher_highs = last_high > prev_high;
        let higher_lows = last_low > prev_low;
        let lower_highs = last_high < prev_high;
        let lower_lows = last_low < prev_low;

        let (bias, strength, confidence) = if higher_highs && higher_lows {
            (Bias::Bullish, Strength::Strong, 80.0)
        } else if higher_highs || higher_lows {
            (Bias::Bullish, Strength::Medium, 65.0)
        } else if lower_highs && lower_lows {
            (Bias::Bearish, Strength::Strong, 80.0)
        } else if lower_highs || lower_lows {
            (Bias::Bearish, Strength::Medium, 65.0)
        } else {
            (Bias::Neutral, Strength::Weak, 40.0)
        };

        Ok(TrendAnalysis::new(
            METHOD,
            bias,
            strength,
            confidence,
            metrics,
            TrendDetails::Structure {
                swing_highs,
                swing_lows,
                higher_highs,
                higher_lows,
                lower_highs,
                lower_lows,
            },
        ))
    }
}

fn last_pair(points: &[SwingPoint]) -> (f64, f64) {
    let n = points.len();
    (points[n - 2].price, points[n - 1].price)
}
