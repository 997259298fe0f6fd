//! Analysis configuration.
//!
//! `AnalysisConfig` is an immutable value: every stage reads it, nothing writes
//! it. All sections carry `#[serde(default)]`, so a TOML file only needs the
//! fields it changes. Presets live in [`presets`] and build fresh values.

pub mod methods;
pub mod presets;

pub use methods::{EntryMethod, PriceActionMethod, TrendMethod, ZoneMethod};
pub use presets::ConfigPreset;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{Granularity, PipSizeTable};
use crate::indicators::MaKind;

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown {component} method: {name}")]
    UnknownMethod {
        component: &'static str,
        name: String,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─── Sections ────────────────────────────────────────────────────────

/// Moving averages and ATR attached to every candle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverageConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub trend_period: usize,
    pub kind: MaKind,
    pub atr_period: usize,
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            fast_period: 21,
            slow_period: 50,
            trend_period: 200,
            kind: MaKind::Ema,
            atr_period: 14,
        }
    }
}

/// Which granularity feeds which stage, and how many candles to request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeframeConfig {
    /// Trend classification timeframe.
    pub trend: Granularity,
    /// Zone construction timeframe.
    pub zone: Granularity,
    /// Price action, entry timing, volume and risk timeframe.
    pub execution: Granularity,
    /// Timeframes combined by the multi-timeframe trend method.
    pub multi_timeframe: Vec<Granularity>,
    pub candle_counts: BTreeMap<Granularity, usize>,
    /// Count used for a granularity missing from `candle_counts`.
    pub default_candle_count: usize,
}

impl Default for TimeframeConfig {
    fn default() -> Self {
        Self {
            trend: Granularity::D,
            zone: Granularity::H4,
            execution: Granularity::H1,
            multi_timeframe: vec![Granularity::D, Granularity::H4, Granularity::H1],
            candle_counts: BTreeMap::from([
                (Granularity::D, 250),
                (Granularity::H4, 250),
                (Granularity::H1, 500),
            ]),
            default_candle_count: 250,
        }
    }
}

impl TimeframeConfig {
    pub fn candle_count(&self, granularity: Granularity) -> usize {
        self.candle_counts
            .get(&granularity)
            .copied()
            .unwrap_or(self.default_candle_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeConfig {
    pub lookback: usize,
    pub fast_period: usize,
    pub slow_period: usize,
    pub trend_period: usize,
    pub price_period: usize,
    /// Minimum |slope / ATR| counted as directional.
    pub threshold: f64,
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            fast_period: 5,
            slow_period: 10,
            trend_period: 15,
            price_period: 8,
            threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    pub lookback: usize,
    /// Half-width of the swing detection window.
    pub swing_period: usize,
    /// Most recent swings kept per side.
    pub max_swings: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            lookback: 50,
            swing_period: 5,
            max_swings: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumTrendConfig {
    pub lookback: usize,
    pub roc_period: usize,
    pub rsi_period: usize,
    pub momentum_period: usize,
    pub roc_strong_threshold: f64,
    pub momentum_threshold: f64,
    pub rsi_bullish: f64,
    pub rsi_bearish: f64,
}

impl Default for MomentumTrendConfig {
    fn default() -> Self {
        Self {
            lookback: 30,
            roc_period: 10,
            rsi_period: 14,
            momentum_period: 12,
            roc_strong_threshold: 2.0,
            momentum_threshold: 0.5,
            rsi_bullish: 60.0,
            rsi_bearish: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiTimeframeConfig {
    /// Vote weight per timeframe; timeframes not listed weigh 1.
    pub weights: BTreeMap<Granularity, f64>,
    pub bullish_threshold: f64,
    pub bearish_threshold: f64,
    pub strong_threshold: f64,
}

impl Default for MultiTimeframeConfig {
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (Granularity::D, 3.0),
                (Granularity::H4, 2.0),
                (Granularity::H1, 1.0),
            ]),
            bullish_threshold: 0.3,
            bearish_threshold: -0.3,
            strong_threshold: 0.6,
        }
    }
}

impl MultiTimeframeConfig {
    pub fn weight(&self, granularity: Granularity) -> f64 {
        self.weights.get(&granularity).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub method: TrendMethod,
    pub slope: SlopeConfig,
    pub structure: StructureConfig,
    pub momentum: MomentumTrendConfig,
    pub multi_timeframe: MultiTimeframeConfig,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            method: TrendMethod::CompositeTrend,
            slope: SlopeConfig::default(),
            structure: StructureConfig::default(),
            momentum: MomentumTrendConfig::default(),
            multi_timeframe: MultiTimeframeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    pub lookback: usize,
    pub high_multiplier: f64,
    pub normal_multiplier: f64,
    pub low_multiplier: f64,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            lookback: 30,
            high_multiplier: 1.2,
            normal_multiplier: 0.8,
            low_multiplier: 0.6,
        }
    }
}

/// Width multipliers by trend strength; strong trends get tighter zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendStrengthMultipliers {
    pub strong: f64,
    pub medium: f64,
    pub weak: f64,
}

impl Default for TrendStrengthMultipliers {
    fn default() -> Self {
        Self {
            strong: 0.7,
            medium: 0.9,
            weak: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConditionConfig {
    pub lookback: usize,
    pub trending_multiplier: f64,
    pub ranging_multiplier: f64,
    pub mixed_multiplier: f64,
    pub trending_efficiency: f64,
    pub ranging_efficiency: f64,
    pub trending_r_squared: f64,
}

impl Default for MarketConditionConfig {
    fn default() -> Self {
        Self {
            lookback: 40,
            trending_multiplier: 0.8,
            ranging_multiplier: 1.3,
            mixed_multiplier: 1.0,
            trending_efficiency: 0.6,
            ranging_efficiency: 0.3,
            trending_r_squared: 0.5,
        }
    }
}

/// Blend weights for composite zone widths. Normalised by their sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub atr: f64,
    pub volatility: f64,
    pub market_condition: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            atr: 0.4,
            volatility: 0.3,
            market_condition: 0.3,
        }
    }
}

impl CompositeWeights {
    pub fn sum(&self) -> f64 {
        self.atr + self.volatility + self.market_condition
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneMetadataConfig {
    pub lookback: usize,
    pub min_touches: usize,
    pub wick_rejection_ratio: f64,
}

impl Default for ZoneMetadataConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            min_touches: 2,
            wick_rejection_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub method: ZoneMethod,
    pub width_pips: f64,
    pub atr_multiplier: f64,
    pub volatility: VolatilityConfig,
    pub trend_multipliers: TrendStrengthMultipliers,
    pub market_condition: MarketConditionConfig,
    pub weights: CompositeWeights,
    pub metadata: ZoneMetadataConfig,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            method: ZoneMethod::CompositeZones,
            width_pips: 15.0,
            atr_multiplier: 0.75,
            volatility: VolatilityConfig::default(),
            trend_multipliers: TrendStrengthMultipliers::default(),
            market_condition: MarketConditionConfig::default(),
            weights: CompositeWeights::default(),
            metadata: ZoneMetadataConfig::default(),
        }
    }
}

/// Geometric thresholds for single- and multi-candle patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleThresholds {
    pub doji_body_ratio: f64,
    pub hammer_wick_ratio: f64,
    pub hammer_upper_wick_ratio: f64,
    pub shooting_star_wick_ratio: f64,
    pub shooting_star_lower_wick_ratio: f64,
    pub marubozu_body_ratio: f64,
    pub engulfing_ratio: f64,
    pub pin_bar_wick_ratio: f64,
    pub pin_bar_opposite_wick_ratio: f64,
    pub pin_bar_body_ratio: f64,
    pub star_body_ratio: f64,
}

impl Default for CandleThresholds {
    fn default() -> Self {
        Self {
            doji_body_ratio: 0.1,
            hammer_wick_ratio: 2.0,
            hammer_upper_wick_ratio: 0.5,
            shooting_star_wick_ratio: 2.0,
            shooting_star_lower_wick_ratio: 0.5,
            marubozu_body_ratio: 0.9,
            engulfing_ratio: 1.2,
            pin_bar_wick_ratio: 0.6,
            pin_bar_opposite_wick_ratio: 0.2,
            pin_bar_body_ratio: 0.3,
            star_body_ratio: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    pub min_candles: usize,
    /// Mean body / window range below which the window counts as consolidation.
    pub consolidation_ratio: f64,
    /// Net move (fraction of first close) required for a flag pole.
    pub trend_threshold: f64,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            min_candles: 5,
            consolidation_ratio: 0.4,
            trend_threshold: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceActionConfig {
    pub method: PriceActionMethod,
    pub candles: CandleThresholds,
    pub flag: FlagConfig,
    pub reversal_lookback: usize,
    pub continuation_lookback: usize,
    pub momentum_lookback: usize,
    pub breakout_lookback: usize,
    pub breakout_threshold: f64,
    pub strong_close_ratio: f64,
    pub min_gap: f64,
    pub volume_lookback: usize,
    pub high_volume_multiplier: f64,
    pub divergence_lookback: usize,
    pub divergence_threshold: f64,
    pub zone_context_bonus: f64,
    pub trend_alignment_bonus: f64,
    /// Distance to a zone edge, as a fraction of zone height, that counts as "at the zone".
    pub zone_proximity_ratio: f64,
    pub min_confluence_patterns: usize,
    pub confluence_group_bonus: f64,
}

impl Default for PriceActionConfig {
    fn default() -> Self {
        Self {
            method: PriceActionMethod::Comprehensive,
            candles: CandleThresholds::default(),
            flag: FlagConfig::default(),
            reversal_lookback: 5,
            continuation_lookback: 10,
            momentum_lookback: 8,
            breakout_lookback: 10,
            breakout_threshold: 0.005,
            strong_close_ratio: 0.8,
            min_gap: 0.002,
            volume_lookback: 10,
            high_volume_multiplier: 2.0,
            divergence_lookback: 15,
            divergence_threshold: 0.01,
            zone_context_bonus: 15.0,
            trend_alignment_bonus: 10.0,
            zone_proximity_ratio: 0.5,
            min_confluence_patterns: 2,
            confluence_group_bonus: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub method: EntryMethod,
    pub wick_rejection_ratio: f64,
    pub pullback_lookback: usize,
    pub breakout_lookback: usize,
    pub min_confirmations: usize,
    pub volume_multiplier: f64,
    pub volume_window: usize,
    /// Close position at or above which a candle counts as a strong bullish close.
    pub strong_close_high: f64,
    /// Close position at or below which a candle counts as a strong bearish close.
    pub strong_close_low: f64,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            method: EntryMethod::ZoneRejection,
            wick_rejection_ratio: 2.0,
            pullback_lookback: 10,
            breakout_lookback: 20,
            min_confirmations: 2,
            volume_multiplier: 1.3,
            volume_window: 5,
            strong_close_high: 0.7,
            strong_close_low: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub volume_lookback: usize,
    pub volume_spike_multiplier: f64,
    pub risk_atr_period: usize,
    /// Stop distance in ATRs.
    pub risk_multiplier: f64,
    /// Target distance as a multiple of the stop distance.
    pub reward_ratio: f64,
    /// Suppress signals unless the entry timing stage fires in the same direction.
    pub require_entry_confirmation: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            volume_lookback: 20,
            volume_spike_multiplier: 1.5,
            risk_atr_period: 14,
            risk_multiplier: 2.5,
            reward_ratio: 1.7,
            require_entry_confirmation: false,
        }
    }
}

// ─── AnalysisConfig ──────────────────────────────────────────────────

/// Complete, read-only analysis configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub moving_averages: MovingAverageConfig,
    pub timeframes: TimeframeConfig,
    pub trend: TrendConfig,
    pub zones: ZoneConfig,
    pub price_action: PriceActionConfig,
    pub entry: EntryConfig,
    pub signal: SignalConfig,
    pub pip_sizes: PipSizeTable,
}

/// Parse `section.method` from a raw table so an unknown name surfaces as
/// `ConfigError::UnknownMethod` rather than a generic parse failure.
fn check_method<M>(table: &toml::Table, section: &str) -> Result<(), ConfigError>
where
    M: FromStr<Err = ConfigError>,
{
    let name = table
        .get(section)
        .and_then(|s| s.get("method"))
        .and_then(|m| m.as_str());
    if let Some(name) = name {
        name.parse::<M>()?;
    }
    Ok(())
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;
        check_method::<TrendMethod>(&table, "trend")?;
        check_method::<ZoneMethod>(&table, "zones")?;
        check_method::<PriceActionMethod>(&table, "price_action")?;
        check_method::<EntryMethod>(&table, "entry")?;

        let config: Self = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Replace the four method selectors, keeping every other parameter.
    pub fn with_methods(
        mut self,
        trend: TrendMethod,
        zones: ZoneMethod,
        price_action: PriceActionMethod,
        entry: EntryMethod,
    ) -> Self {
        self.trend.method = trend;
        self.zones.method = zones;
        self.price_action.method = price_action;
        self.entry.method = entry;
        self
    }

    /// Every granularity the pipeline needs to fetch for this configuration.
    pub fn required_granularities(&self) -> BTreeSet<Granularity> {
        let tf = &self.timeframes;
        let mut set = BTreeSet::from([tf.trend, tf.zone, tf.execution]);
        if matches!(
            self.trend.method,
            TrendMethod::MultiTimeframe | TrendMethod::CompositeTrend
        ) {
            set.extend(tf.multi_timeframe.iter().copied());
        }
        set
    }

    /// Reject values no analysis could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ma = &self.moving_averages;
        let periods = [
            ("moving_averages.fast_period", ma.fast_period),
            ("moving_averages.slow_period", ma.slow_period),
            ("moving_averages.trend_period", ma.trend_period),
            ("moving_averages.atr_period", ma.atr_period),
            ("trend.slope.fast_period", self.trend.slope.fast_period),
            ("trend.slope.slow_period", self.trend.slope.slow_period),
            ("trend.slope.trend_period", self.trend.slope.trend_period),
            ("trend.slope.price_period", self.trend.slope.price_period),
            ("trend.slope.lookback", self.trend.slope.lookback),
            ("trend.structure.lookback", self.trend.structure.lookback),
            ("trend.structure.swing_period", self.trend.structure.swing_period),
            ("trend.momentum.roc_period", self.trend.momentum.roc_period),
            ("trend.momentum.rsi_period", self.trend.momentum.rsi_period),
            ("trend.momentum.momentum_period", self.trend.momentum.momentum_period),
            ("trend.momentum.lookback", self.trend.momentum.lookback),
            ("zones.metadata.lookback", self.zones.metadata.lookback),
            ("zones.volatility.lookback", self.zones.volatility.lookback),
            ("zones.market_condition.lookback", self.zones.market_condition.lookback),
            ("price_action.reversal_lookback", self.price_action.reversal_lookback),
            ("price_action.continuation_lookback", self.price_action.continuation_lookback),
            ("price_action.momentum_lookback", self.price_action.momentum_lookback),
            ("price_action.breakout_lookback", self.price_action.breakout_lookback),
            ("price_action.flag.min_candles", self.price_action.flag.min_candles),
            ("price_action.volume_lookback", self.price_action.volume_lookback),
            ("price_action.divergence_lookback", self.price_action.divergence_lookback),
            ("entry.pullback_lookback", self.entry.pullback_lookback),
            ("entry.breakout_lookback", self.entry.breakout_lookback),
            ("entry.volume_window", self.entry.volume_window),
            ("entry.min_confirmations", self.entry.min_confirmations),
            ("signal.volume_lookback", self.signal.volume_lookback),
            ("signal.risk_atr_period", self.signal.risk_atr_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be >= 1")));
            }
        }

        let non_negative = [
            ("zones.width_pips", self.zones.width_pips),
            ("zones.atr_multiplier", self.zones.atr_multiplier),
            ("zones.volatility.high_multiplier", self.zones.volatility.high_multiplier),
            ("zones.volatility.normal_multiplier", self.zones.volatility.normal_multiplier),
            ("zones.volatility.low_multiplier", self.zones.volatility.low_multiplier),
            ("zones.trend_multipliers.strong", self.zones.trend_multipliers.strong),
            ("zones.trend_multipliers.medium", self.zones.trend_multipliers.medium),
            ("zones.trend_multipliers.weak", self.zones.trend_multipliers.weak),
            ("zones.market_condition.trending_multiplier", self.zones.market_condition.trending_multiplier),
            ("zones.market_condition.ranging_multiplier", self.zones.market_condition.ranging_multiplier),
            ("zones.market_condition.mixed_multiplier", self.zones.market_condition.mixed_multiplier),
            ("zones.weights.atr", self.zones.weights.atr),
            ("zones.weights.volatility", self.zones.weights.volatility),
            ("zones.weights.market_condition", self.zones.weights.market_condition),
            ("zones.metadata.wick_rejection_ratio", self.zones.metadata.wick_rejection_ratio),
            ("entry.wick_rejection_ratio", self.entry.wick_rejection_ratio),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }

        if self.zones.weights.sum() <= 0.0 {
            return Err(ConfigError::Invalid(
                "zones.weights must have a positive sum".into(),
            ));
        }

        let positive = [
            ("signal.risk_multiplier", self.signal.risk_multiplier),
            ("signal.reward_ratio", self.signal.reward_ratio),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }

        for (granularity, weight) in &self.trend.multi_timeframe.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "trend.multi_timeframe.weights.{granularity} must be finite and >= 0"
                )));
            }
        }

        self.pip_sizes
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }
}
