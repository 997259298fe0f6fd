//! In-memory candle source for tests and embedding.

use std::collections::BTreeMap;

use super::source::{CandleSource, SourceError};
use crate::domain::{normalize_instrument, Candle, Granularity};

/// Candles held in memory, keyed by normalized instrument and granularity.
#[derive(Debug, Clone, Default)]
pub struct MemoryCandleSource {
    candles: BTreeMap<(String, Granularity), Vec<Candle>>,
}

impl MemoryCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store candles, replacing any previously stored for the same key.
    pub fn insert(&mut self, instrument: &str, granularity: Granularity, candles: Vec<Candle>) {
        self.candles
            .insert((normalize_instrument(instrument), granularity), candles);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, instrument: &str, granularity: Granularity, candles: Vec<Candle>) -> Self {
        self.insert(instrument, granularity, candles);
        self
    }

    pub fn instruments(&self) -> Vec<String> {
        let mut names: Vec<String> = self.candles.keys().map(|(i, _)| i.clone()).collect();
        names.dedup();
        names
    }
}

impl CandleSource for MemoryCandleSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let key = (normalize_instrument(instrument), granularity);
        let candles = self.candles.get(&key).ok_or_else(|| SourceError::NotFound {
            instrument: key.0.clone(),
            granularity,
        })?;
        if candles.is_empty() {
            return Err(SourceError::Empty {
                instrument: key.0,
                granularity,
            });
        }
        let start = candles.len().saturating_sub(count);
        Ok(candles[start..].to_vec())
    }
}
