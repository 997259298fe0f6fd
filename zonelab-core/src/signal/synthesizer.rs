//! Combine price action, zones, trend, volume and entry timing into an
//! [`EntrySignal`].

use std::collections::BTreeSet;
use tracing::debug;

use super::{EntrySignal, RiskReward, ScoreBreakdown, SignalKind};
use crate::config::SignalConfig;
use crate::domain::{Confidence, Direction, Strength};
use crate::entry::EntryDecision;
use crate::indicators::VolumeProfile;
use crate::price_action::PriceActionResult;
use crate::trend::TrendAnalysis;
use crate::zones::{Zone, ZoneName};

const STRONG_PRICE_ACTION: i32 = 40;
const PLAIN_PRICE_ACTION: i32 = 20;
const PER_MA_ZONE: i32 = 15;
const ALIGNED_STRONG_TREND: i32 = 25;
const ALIGNED_TREND: i32 = 15;
const COUNTER_TREND: i32 = -20;
const VOLUME_SPIKE: i32 = 10;

/// Everything the synthesizer reads.
#[derive(Debug, Clone, Copy)]
pub struct SignalInputs<'a> {
    /// Latest execution-timeframe close.
    pub entry_price: f64,
    pub price_action: &'a PriceActionResult,
    pub zones: &'a [Zone],
    pub trend: &'a TrendAnalysis,
    pub volume: &'a VolumeProfile,
    pub entry: &'a EntryDecision,
    /// Execution-timeframe ATR for the stop distance.
    pub atr: Option<f64>,
    pub pip_size: f64,
}

fn trend_points(direction: Direction, trend: &TrendAnalysis) -> i32 {
    match trend.bias.direction() {
        None => 0,
        Some(d) if d == direction && trend.strength == Strength::Strong => ALIGNED_STRONG_TREND,
        Some(d) if d == direction => ALIGNED_TREND,
        Some(_) => COUNTER_TREND,
    }
}

/// Score breakdown for a price-action direction.
pub fn score(
    direction: Direction,
    inputs: &SignalInputs<'_>,
    active: &BTreeSet<ZoneName>,
) -> ScoreBreakdown {
    let ma_zones = active
        .iter()
        .filter(|n| matches!(n, ZoneName::FastMaZone | ZoneName::SlowMaZone))
        .count() as i32;
    ScoreBreakdown {
        price_action: if inputs.price_action.strong() {
            STRONG_PRICE_ACTION
        } else {
            PLAIN_PRICE_ACTION
        },
        zones: ma_zones * PER_MA_ZONE,
        trend: trend_points(direction, inputs.trend),
        volume: if inputs.volume.is_spike { VOLUME_SPIKE } else { 0 },
    }
}

/// Grade the inputs into a signal with risk levels.
pub fn synthesize(inputs: &SignalInputs<'_>, config: &SignalConfig) -> EntrySignal {
    if !inputs.entry_price.is_finite() {
        return EntrySignal::no_signal(None);
    }
    let price = inputs.entry_price;
    let active_zones: BTreeSet<ZoneName> = inputs
        .zones
        .iter()
        .filter(|z| z.is_active(price))
        .map(Zone::name)
        .collect();

    let Some(direction) = inputs.price_action.direction() else {
        return EntrySignal {
            active_zones,
            ..EntrySignal::no_signal(Some(price))
        };
    };

    let breakdown = score(direction, inputs, &active_zones);
    let total = breakdown.total();
    let trend_alignment = inputs.trend.bias == direction.as_bias();
    let mut signal = SignalKind::from_score(direction, total);
    let mut suppressed = None;

    if config.require_entry_confirmation && signal != SignalKind::NoSignal {
        let entry = inputs.entry;
        let confirmed = entry.fires() && entry.direction.map_or(true, |d| d == direction);
        if !confirmed {
            suppressed = Some(format!(
                "{} entry timing did not confirm a {direction} entry",
                entry.method
            ));
            signal = SignalKind::NoSignal;
        }
    }

    let risk_reward = match (signal.direction(), inputs.atr) {
        (Some(d), Some(atr)) => RiskReward::from_atr(
            d,
            price,
            atr,
            config.risk_multiplier,
            config.reward_ratio,
            inputs.pip_size,
        )
        .map_err(|err| debug!(error = %err, "risk levels unavailable"))
        .ok(),
        _ => None,
    };

    debug!(
        %signal,
        score = total,
        price_action = breakdown.price_action,
        zones = breakdown.zones,
        trend = breakdown.trend,
        volume = breakdown.volume,
        "signal synthesized"
    );

    EntrySignal {
        signal,
        confidence: Confidence::new(total as f64),
        entry_price: Some(price),
        active_zones,
        trend_alignment,
        risk_reward,
        score: breakdown,
        suppressed,
    }
}
