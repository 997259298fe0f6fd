//! Momentum: simple lookback difference.
//!
//! momentum[t] = close[t] - close[t-period]
//! Lookback: period.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Momentum period must be >= 1");
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<Option<f64>> {
        let mut result = vec![None; candles.len()];
        for i in self.period..candles.len() {
            let diff = candles[i].close - candles[i - self.period].close;
            result[i] = diff.is_finite().then_some(diff);
        }
        result
    }
}
