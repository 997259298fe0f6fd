//! Factory functions: method selectors → runtime trait objects.
//!
//! One `create_*` per polymorphic stage, matching on the method enum. The
//! `*_by_name` variants parse a wire name first, so an unknown method has a
//! single error path (`ConfigError::UnknownMethod`).

use crate::config::{
    ConfigError, EntryMethod, PriceActionMethod, TrendConfig, TrendMethod, ZoneMethod,
};
use crate::entry::{
    BreakoutRetest, ConfluenceConfirmation, EntryTiming, Immediate, PullbackCompletion,
    ZoneRejection,
};
use crate::price_action::{
    BasicPatterns, Comprehensive, ConfluencePatterns, ContinuationPatterns, MomentumPatterns,
    PatternMatcher, ReversalPatterns,
};
use crate::trend::{
    CompositeTrend, MaAlignment, MarketStructure, MomentumTrend, MultiTimeframe, SlopeAnalysis,
    TrendClassifier,
};
use crate::zones::{
    AtrBased, CompositeZones, FixedWidth, MarketConditionSizer, TrendAdaptive, VolatilityAdaptive,
    ZoneSizer,
};

// ─── Trend ───────────────────────────────────────────────────────────

/// Create the classifier selected by `config.method`.
pub fn create_trend_classifier(config: &TrendConfig) -> Box<dyn TrendClassifier> {
    match config.method {
        TrendMethod::MaAlignment => Box::new(MaAlignment::new()),
        TrendMethod::SlopeAnalysis => Box::new(SlopeAnalysis::new(config.slope.clone())),
        TrendMethod::MarketStructure => Box::new(MarketStructure::new(config.structure.clone())),
        TrendMethod::MomentumTrend => Box::new(MomentumTrend::new(config.momentum.clone())),
        TrendMethod::MultiTimeframe => {
            Box::new(MultiTimeframe::new(config.multi_timeframe.clone()))
        }
        TrendMethod::CompositeTrend => Box::new(CompositeTrend::new(config)),
    }
}

pub fn trend_classifier_by_name(
    name: &str,
    config: &TrendConfig,
) -> Result<Box<dyn TrendClassifier>, ConfigError> {
    let method: TrendMethod = name.parse()?;
    Ok(create_trend_classifier(&TrendConfig {
        method,
        ..config.clone()
    }))
}

// ─── Zones ───────────────────────────────────────────────────────────

pub fn create_zone_sizer(method: ZoneMethod) -> Box<dyn ZoneSizer> {
    match method {
        ZoneMethod::Fixed => Box::new(FixedWidth),
        ZoneMethod::AtrBased => Box::new(AtrBased),
        ZoneMethod::VolatilityAdaptive => Box::new(VolatilityAdaptive),
        ZoneMethod::TrendAdaptive => Box::new(TrendAdaptive),
        ZoneMethod::MarketCondition => Box::new(MarketConditionSizer),
        ZoneMethod::CompositeZones => Box::new(CompositeZones),
    }
}

pub fn zone_sizer_by_name(name: &str) -> Result<Box<dyn ZoneSizer>, ConfigError> {
    Ok(create_zone_sizer(name.parse()?))
}

// ─── Price action ────────────────────────────────────────────────────

pub fn create_pattern_matcher(method: PriceActionMethod) -> Box<dyn PatternMatcher> {
    match method {
        PriceActionMethod::BasicPatterns => Box::new(BasicPatterns),
        PriceActionMethod::ReversalPatterns => Box::new(ReversalPatterns),
        PriceActionMethod::ContinuationPatterns => Box::new(ContinuationPatterns),
        PriceActionMethod::MomentumPatterns => Box::new(MomentumPatterns),
        PriceActionMethod::ConfluencePatterns => Box::new(ConfluencePatterns),
        PriceActionMethod::Comprehensive => Box::new(Comprehensive),
    }
}

pub fn pattern_matcher_by_name(name: &str) -> Result<Box<dyn PatternMatcher>, ConfigError> {
    Ok(create_pattern_matcher(name.parse()?))
}

// ─── Entry timing ────────────────────────────────────────────────────

pub fn create_entry_timing(method: EntryMethod) -> Box<dyn EntryTiming> {
    match method {
        EntryMethod::Immediate => Box::new(Immediate),
        EntryMethod::ZoneRejection => Box::new(ZoneRejection),
        EntryMethod::PullbackCompletion => Box::new(PullbackCompletion),
        EntryMethod::BreakoutRetest => Box::new(BreakoutRetest),
        EntryMethod::ConfluenceConfirmation => Box::new(ConfluenceConfirmation),
    }
}

pub fn entry_timing_by_name(name: &str) -> Result<Box<dyn EntryTiming>, ConfigError> {
    Ok(create_entry_timing(name.parse()?))
}
