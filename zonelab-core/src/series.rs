//! Candle series with attached derived columns.
//!
//! A `CandleSeries` owns a chronologically ordered, timestamp-unique candle
//! vector plus the fast/slow/trend moving averages and ATR computed over it.
//! Trend and zone stages read the same columns, so both always see the same
//! EMA seeding and ATR smoothing.

use tracing::debug;

use crate::config::MovingAverageConfig;
use crate::domain::{Candle, Granularity};
use crate::indicators::{latest, Atr, Indicator, IndicatorError};

/// Latest values of the derived columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSnapshot {
    pub close: f64,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub trend_ma: Option<f64>,
    pub atr: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CandleSeries {
    instrument: String,
    granularity: Granularity,
    candles: Vec<Candle>,
    fast_ma: Vec<Option<f64>>,
    slow_ma: Vec<Option<f64>>,
    trend_ma: Vec<Option<f64>>,
    atr: Vec<Option<f64>>,
    rejected_candles: usize,
    ma_config: MovingAverageConfig,
}

impl CandleSeries {
    /// Build a series from raw candles.
    ///
    /// Candles failing the sanity check are dropped and counted. The rest are
    /// sorted by timestamp; on a duplicate timestamp the later candle wins.
    pub fn build(
        instrument: impl Into<String>,
        granularity: Granularity,
        candles: Vec<Candle>,
        ma_config: &MovingAverageConfig,
    ) -> Self {
        let total = candles.len();
        let mut sane: Vec<Candle> = candles.into_iter().filter(Candle::is_sane).collect();
        let rejected_candles = total - sane.len();
        sane.sort_by_key(|c| c.timestamp);

        let mut ordered: Vec<Candle> = Vec::with_capacity(sane.len());
        for candle in sane {
            match ordered.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => ordered.push(candle),
            }
        }

        let instrument = instrument.into();
        if rejected_candles > 0 {
            debug!(%instrument, %granularity, rejected_candles, "dropped malformed candles");
        }

        let mut series = Self {
            instrument,
            granularity,
            candles: ordered,
            fast_ma: Vec::new(),
            slow_ma: Vec::new(),
            trend_ma: Vec::new(),
            atr: Vec::new(),
            rejected_candles,
            ma_config: ma_config.clone(),
        };
        series.recompute();
        series
    }

    fn recompute(&mut self) {
        let cfg = &self.ma_config;
        self.fast_ma = cfg.kind.build(cfg.fast_period).compute(&self.candles);
        self.slow_ma = cfg.kind.build(cfg.slow_period).compute(&self.candles);
        self.trend_ma = cfg.kind.build(cfg.trend_period).compute(&self.candles);
        self.atr = Atr::new(cfg.atr_period).compute(&self.candles);
    }

    /// Append candles strictly newer than the current last candle and extend
    /// the derived columns. Returns the number of candles appended.
    ///
    /// Indicators are causal, so values already computed for older candles
    /// are unchanged.
    pub fn extend(&mut self, candles: impl IntoIterator<Item = Candle>) -> usize {
        let mut appended = 0;
        for candle in candles {
            if !candle.is_sane() {
                self.rejected_candles += 1;
                continue;
            }
            let newer = self
                .candles
                .last()
                .map_or(true, |last| candle.timestamp > last.timestamp);
            if newer {
                self.candles.push(candle);
                appended += 1;
            }
        }
        if appended > 0 {
            self.recompute();
        }
        appended
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn fast_ma(&self) -> &[Option<f64>] {
        &self.fast_ma
    }

    pub fn slow_ma(&self) -> &[Option<f64>] {
        &self.slow_ma
    }

    pub fn trend_ma(&self) -> &[Option<f64>] {
        &self.trend_ma
    }

    pub fn atr(&self) -> &[Option<f64>] {
        &self.atr
    }

    pub fn ma_config(&self) -> &MovingAverageConfig {
        &self.ma_config
    }

    /// Candles dropped by the sanity check.
    pub fn rejected_candles(&self) -> usize {
        self.rejected_candles
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The last `n` candles (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Candle] {
        &self.candles[self.candles.len().saturating_sub(n)..]
    }

    pub fn snapshot(&self) -> Option<SeriesSnapshot> {
        self.last().map(|c| SeriesSnapshot {
            close: c.close,
            fast_ma: latest(&self.fast_ma),
            slow_ma: latest(&self.slow_ma),
            trend_ma: latest(&self.trend_ma),
            atr: latest(&self.atr),
        })
    }

    /// Fail with `InsufficientData` when fewer than `needed` candles exist.
    pub fn require(&self, what: &str, needed: usize) -> Result<(), IndicatorError> {
        if self.len() < needed {
            Err(IndicatorError::InsufficientData {
                indicator: what.to_string(),
                needed,
                available: self.len(),
            })
        } else {
            Ok(())
        }
    }
}
