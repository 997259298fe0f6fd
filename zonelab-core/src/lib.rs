//! ZoneLab Core: multi-timeframe zone analysis for FX candles.
//!
//! This crate contains the whole signal pipeline:
//! - Domain types (candles, granularities, directions, confidence, pip sizes)
//! - Indicator engine and candle series with derived MA / ATR columns
//! - Trend classifiers, zone sizers, price-action matchers, entry timing
//! - Signal synthesis with ATR-based risk/reward
//! - Configuration, presets and fingerprinting
//! - Candle sources and the `analyze` pipeline

pub mod config;
pub mod data;
pub mod domain;
pub mod entry;
pub mod factory;
pub mod fingerprint;
pub mod indicators;
pub mod pipeline;
pub mod price_action;
pub mod series;
pub mod signal;
pub mod trend;
pub mod zones;

pub use config::{AnalysisConfig, ConfigError, ConfigPreset};
pub use pipeline::{
    analyze, analyze_many, analyze_snapshot, AnalysisError, AnalysisResult, AnalysisStatus,
    MarketSnapshot,
};
