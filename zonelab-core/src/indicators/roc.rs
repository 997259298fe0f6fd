//! Rate of Change (ROC).
//!
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Lookback: period. A zero base yields `None`.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<Option<f64>> {
        let mut result = vec![None; candles.len()];
        for i in self.period..candles.len() {
            let prev = candles[i - self.period].close;
            let curr = candles[i].close;
            if prev != 0.0 {
                let roc = (curr - prev) / prev * 100.0;
                result[i] = roc.is_finite().then_some(roc);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn roc_basic() {
        let candles = make_candles(&[100.0, 110.0, 121.0]);
        let result = Roc::new(1).compute(&candles);
        assert!(result[0].is_none());
        assert_approx(result[1].unwrap(), 10.0, DEFAULT_EPSILON);
        assert_approx(result[2].unwrap(), 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_period_2() {
        let candles = make_candles(&[100.0, 110.0, 121.0]);
        let result = Roc::new(2).compute(&candles);
        assert_approx(result[2].unwrap(), 21.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_zero_base_is_undefined() {
        let candles = make_candles(&[0.0, 5.0]);
        assert!(Roc::new(1).compute(&candles)[1].is_none());
    }
}
