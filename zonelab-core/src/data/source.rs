//! Candle source trait and structured error types.
//!
//! The `CandleSource` trait abstracts over where candles come from (a broker
//! API, CSV exports, an in-memory fixture) so the pipeline can run against any
//! of them. Rate limiting, caching and retries belong to the implementation;
//! the pipeline calls `fetch` once per granularity and never retries.

use thiserror::Error;

use crate::domain::{Candle, Granularity};

/// Structured error types for candle fetching.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no data for {instrument} {granularity}")]
    NotFound {
        instrument: String,
        granularity: Granularity,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path} at row {row}: {reason}")]
    Parse {
        path: String,
        row: usize,
        reason: String,
    },

    #[error("{instrument} {granularity} returned no candles")]
    Empty {
        instrument: String,
        granularity: Granularity,
    },

    #[error("source error: {0}")]
    Other(String),
}

/// Trait for candle sources.
pub trait CandleSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// The most recent `count` candles, oldest first.
    fn fetch(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Vec<Candle>, SourceError>;
}
