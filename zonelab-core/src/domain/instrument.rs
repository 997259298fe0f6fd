//! Instrument naming and pip-size resolution.
//!
//! Pip distances in risk/reward output depend on the quote currency: most FX
//! pairs quote to four decimals, JPY-quoted pairs to two. The table below
//! resolves the pip size per instrument with explicit overrides taking
//! precedence over the quote-currency rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Canonical instrument name: upper case with `_` between base and quote
/// (`eur/usd` → `EUR_USD`). Names without a separator are upper-cased only.
pub fn normalize_instrument(instrument: &str) -> String {
    instrument.trim().to_ascii_uppercase().replace(['/', '-'], "_")
}

/// Quote currency of a currency pair (`EUR_USD` → `USD`, `USDJPY` → `JPY`).
pub fn quote_currency(instrument: &str) -> Option<String> {
    let normalized = normalize_instrument(instrument);
    if let Some((_, quote)) = normalized.rsplit_once('_') {
        return (!quote.is_empty()).then(|| quote.to_string());
    }
    if normalized.len() == 6 && normalized.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(normalized[3..].to_string());
    }
    None
}

/// Pip size lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipSizeTable {
    /// Pip size for pairs not matched by anything else.
    pub default: f64,
    /// Pip size for JPY-quoted pairs.
    pub jpy: f64,
    /// Exact per-instrument sizes, keyed by normalized instrument name.
    pub overrides: BTreeMap<String, f64>,
}

impl Default for PipSizeTable {
    fn default() -> Self {
        Self {
            default: 0.0001,
            jpy: 0.01,
            overrides: BTreeMap::new(),
        }
    }
}

impl PipSizeTable {
    /// Add an override, returning the updated table.
    pub fn with_override(mut self, instrument: &str, pip_size: f64) -> Self {
        self.overrides
            .insert(normalize_instrument(instrument), pip_size);
        self
    }

    /// Resolve the pip size for an instrument.
    pub fn pip_size(&self, instrument: &str) -> f64 {
        let key = normalize_instrument(instrument);
        if let Some(&size) = self.overrides.get(&key) {
            return size;
        }
        match quote_currency(&key).as_deref() {
            Some("JPY") => self.jpy,
            _ => self.default,
        }
    }

    /// Convert a price distance to pips for an instrument.
    pub fn to_pips(&self, instrument: &str, distance: f64) -> f64 {
        distance / self.pip_size(instrument)
    }

    /// All sizes must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        let entries = [("<default>", self.default), ("<jpy>", self.jpy)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .chain(self.overrides.iter().map(|(k, v)| (k.clone(), *v)));
        for (instrument, pip_size) in entries {
            if !pip_size.is_finite() || pip_size <= 0.0 {
                return Err(InstrumentError::InvalidPipSize {
                    instrument,
                    pip_size,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("pip size for {instrument} must be positive, got {pip_size}")]
    InvalidPipSize { instrument: String, pip_size: f64 },
}
