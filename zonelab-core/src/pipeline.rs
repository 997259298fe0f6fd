//! The analysis pipeline.
//!
//! ```text
//! fetch (one call per granularity)
//!   → CandleSeries per granularity
//!   → trend (trend timeframe, multi-timeframe map)
//!   → zones (zone timeframe, trend-aware sizing)
//!   → price action + entry timing + volume (execution timeframe)
//!   → signal synthesis + risk levels
//! ```
//!
//! Every stage that cannot run substitutes its documented neutral output and
//! records a [`Degradation`]; the result is always structurally complete.
//! Only an invalid configuration is an `Err`.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, ConfigError};
use crate::data::CandleSource;
use crate::domain::{normalize_instrument, Candle, Granularity};
use crate::entry::{EntryContext, EntryDecision};
use crate::factory::{
    create_entry_timing, create_pattern_matcher, create_trend_classifier, create_zone_sizer,
};
use crate::fingerprint::{config_hash, ConfigHash};
use crate::indicators::{latest, volume_profile, Atr, Indicator, VolumeProfile};
use crate::price_action::{PatternContext, PriceActionResult};
use crate::series::CandleSeries;
use crate::signal::{synthesize, EntrySignal, SignalInputs};
use crate::trend::{analyze_trend, TrendAnalysis, TrendContext, TrendMetrics};
use crate::zones::{build_zones, Zone};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("instrument name is empty")]
    EmptyInstrument,
}

// ─── Result types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Complete,
    Degraded,
    NoData,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Complete => "COMPLETE",
            Self::Degraded => "DEGRADED",
            Self::NoData => "NO_DATA",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Data,
    Trend,
    Zones,
    PriceAction,
    EntryTiming,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Data => "data",
            Self::Trend => "trend",
            Self::Zones => "zones",
            Self::PriceAction => "price_action",
            Self::EntryTiming => "entry_timing",
        })
    }
}

/// A stage that ran on fallback output, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Degradation {
    pub stage: Stage,
    pub reason: String,
}

impl Degradation {
    fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Full output of one instrument's analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub instrument: String,
    pub config_hash: ConfigHash,
    pub status: AnalysisStatus,
    pub degradations: Vec<Degradation>,
    pub trend: TrendAnalysis,
    pub zones: Vec<Zone>,
    pub price_action: PriceActionResult,
    pub entry_timing: EntryDecision,
    pub volume: VolumeProfile,
    pub signal: EntrySignal,
}

impl AnalysisResult {
    /// Neutral output for an instrument with no usable execution data.
    fn no_data(
        instrument: String,
        config: &AnalysisConfig,
        hash: ConfigHash,
        mut degradations: Vec<Degradation>,
        reason: &str,
    ) -> Self {
        degradations.push(Degradation::new(Stage::Data, reason));
        Self {
            instrument,
            config_hash: hash,
            status: AnalysisStatus::NoData,
            degradations,
            trend: TrendAnalysis::degraded(config.trend.method, TrendMetrics::default(), reason),
            zones: Vec::new(),
            price_action: PriceActionResult::degraded(config.price_action.method, reason),
            entry_timing: EntryDecision::no_entry(config.entry.method, reason),
            volume: VolumeProfile::default(),
            signal: EntrySignal::no_signal(None),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status != AnalysisStatus::Complete
    }
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Pre-fetched candles for one instrument, keyed by granularity.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub instrument: String,
    pub candles: BTreeMap<Granularity, Vec<Candle>>,
    /// Fetch failures recorded while the snapshot was assembled.
    pub fetch_failures: Vec<Degradation>,
}

impl MarketSnapshot {
    pub fn new(instrument: &str) -> Self {
        Self {
            instrument: normalize_instrument(instrument),
            ..Self::default()
        }
    }

    pub fn with(mut self, granularity: Granularity, candles: Vec<Candle>) -> Self {
        self.candles.insert(granularity, candles);
        self
    }

    /// Fetch every granularity `config` needs, one call each. Failures are
    /// logged and recorded, never retried.
    pub fn fetch(instrument: &str, source: &dyn CandleSource, config: &AnalysisConfig) -> Self {
        let mut snapshot = Self::new(instrument);
        for granularity in config.required_granularities() {
            let count = config.timeframes.candle_count(granularity);
            match source.fetch(&snapshot.instrument, granularity, count) {
                Ok(candles) => {
                    debug!(
                        instrument = %snapshot.instrument,
                        %granularity,
                        candles = candles.len(),
                        source = source.name(),
                        "fetched candles"
                    );
                    snapshot.candles.insert(granularity, candles);
                }
                Err(err) => {
                    warn!(
                        instrument = %snapshot.instrument,
                        %granularity,
                        source = source.name(),
                        error = %err,
                        "candle fetch failed"
                    );
                    snapshot
                        .fetch_failures
                        .push(Degradation::new(Stage::Data, err.to_string()));
                }
            }
        }
        snapshot
    }
}

// ─── Pipeline ────────────────────────────────────────────────────────

/// Fetch and analyze one instrument.
pub fn analyze(
    instrument: &str,
    source: &dyn CandleSource,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    if instrument.trim().is_empty() {
        return Err(AnalysisError::EmptyInstrument);
    }
    config.validate()?;
    let snapshot = MarketSnapshot::fetch(instrument, source, config);
    analyze_snapshot(&snapshot, config)
}

/// Analyze many instruments in parallel. Results keep the input order.
pub fn analyze_many(
    instruments: &[String],
    source: &dyn CandleSource,
    config: &AnalysisConfig,
) -> Vec<(String, Result<AnalysisResult, AnalysisError>)> {
    instruments
        .par_iter()
        .map(|instrument| (instrument.clone(), analyze(instrument, source, config)))
        .collect()
}

/// Analyze pre-fetched candles.
pub fn analyze_snapshot(
    snapshot: &MarketSnapshot,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let instrument = normalize_instrument(&snapshot.instrument);
    if instrument.is_empty() {
        return Err(AnalysisError::EmptyInstrument);
    }
    config.validate()?;
    let hash = config_hash(config);
    let tf = &config.timeframes;
    let mut degradations = snapshot.fetch_failures.clone();

    let series: BTreeMap<Granularity, CandleSeries> = snapshot
        .candles
        .iter()
        .map(|(&g, candles)| {
            let built = CandleSeries::build(
                instrument.as_str(),
                g,
                candles.clone(),
                &config.moving_averages,
            );
            (g, built)
        })
        .collect();

    let Some(execution) = series.get(&tf.execution).filter(|s| !s.is_empty()) else {
        warn!(%instrument, granularity = %tf.execution, "no execution candles");
        return Ok(AnalysisResult::no_data(
            instrument.clone(),
            config,
            hash,
            degradations,
            &format!("no usable {} candles for {instrument}", tf.execution),
        ));
    };
    let Some(current) = execution.last().map(|c| c.close).filter(|p| p.is_finite()) else {
        return Ok(AnalysisResult::no_data(
            instrument.clone(),
            config,
            hash,
            degradations,
            "latest execution close is not finite",
        ));
    };

    // ── Trend ──
    let timeframes: BTreeMap<Granularity, CandleSeries> = tf
        .multi_timeframe
        .iter()
        .filter_map(|g| series.get(g).map(|s| (*g, s.clone())))
        .collect();
    let trend = match series.get(&tf.trend) {
        Some(primary) => {
            let classifier = create_trend_classifier(&config.trend);
            analyze_trend(classifier.as_ref(), &TrendContext::new(primary, &timeframes))
        }
        None => TrendAnalysis::degraded(
            config.trend.method,
            TrendMetrics::default(),
            format!("no {} candles", tf.trend),
        ),
    };
    if let Some(reason) = &trend.degraded {
        degradations.push(Degradation::new(Stage::Trend, reason.clone()));
    }
    debug!(
        %instrument,
        bias = %trend.bias,
        strength = %trend.strength,
        confidence = trend.confidence.value(),
        "trend classified"
    );

    // ── Zones ──
    let pip_size = config.pip_sizes.pip_size(&instrument);
    let zones = match series.get(&tf.zone) {
        Some(zone_series) => {
            let sizer = create_zone_sizer(config.zones.method);
            let build = build_zones(
                sizer.as_ref(),
                zone_series,
                &config.zones,
                Some(&trend),
                pip_size,
            );
            if !build.omitted.is_empty() {
                let names: Vec<&str> = build.omitted.iter().map(|n| n.as_str()).collect();
                degradations.push(Degradation::new(
                    Stage::Zones,
                    format!("moving average undefined for {}", names.join(", ")),
                ));
            }
            build.zones
        }
        None => {
            degradations.push(Degradation::new(
                Stage::Zones,
                format!("no {} candles", tf.zone),
            ));
            Vec::new()
        }
    };
    debug!(%instrument, zones = zones.len(), method = %config.zones.method, "zones built");

    // ── Execution timeframe ──
    let candles = execution.candles();
    let matcher = create_pattern_matcher(config.price_action.method);
    let price_action = matcher.analyze(&PatternContext {
        candles,
        zones: &zones,
        trend: Some(&trend),
        config: &config.price_action,
    });
    if let Some(reason) = &price_action.degraded {
        degradations.push(Degradation::new(Stage::PriceAction, reason.clone()));
    }
    debug!(
        %instrument,
        signal = %price_action.signal,
        patterns = price_action.patterns.len(),
        "price action scanned"
    );

    let timing = create_entry_timing(config.entry.method);
    let needed = timing.min_candles(&config.entry);
    let entry_timing = timing.evaluate(&EntryContext {
        candles,
        zones: &zones,
        config: &config.entry,
    });
    if candles.len() < needed {
        degradations.push(Degradation::new(Stage::EntryTiming, entry_timing.reason.clone()));
    }
    debug!(
        %instrument,
        signal = %entry_timing.signal,
        confidence = entry_timing.confidence.value(),
        "entry timing evaluated"
    );

    let volume = volume_profile(
        candles,
        config.signal.volume_lookback,
        config.signal.volume_spike_multiplier,
    );
    let atr = latest(&Atr::new(config.signal.risk_atr_period).compute(candles))
        .filter(|a| a.is_finite() && *a > 0.0);

    let signal = synthesize(
        &SignalInputs {
            entry_price: current,
            price_action: &price_action,
            zones: &zones,
            trend: &trend,
            volume: &volume,
            entry: &entry_timing,
            atr,
            pip_size,
        },
        &config.signal,
    );

    let status = if degradations.is_empty() {
        AnalysisStatus::Complete
    } else {
        for d in &degradations {
            warn!(%instrument, stage = %d.stage, reason = %d.reason, "stage degraded");
        }
        AnalysisStatus::Degraded
    };
    info!(
        %instrument,
        signal = %signal.signal,
        confidence = signal.confidence.value(),
        %status,
        config = hash.short(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        instrument,
        config_hash: hash,
        status,
        degradations,
        trend,
        zones,
        price_action,
        entry_timing,
        volume,
        signal,
    })
}
