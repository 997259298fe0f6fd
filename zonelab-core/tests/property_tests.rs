//! Property tests for analysis invariants.
//!
//! Uses proptest to verify:
//! 1. Zone symmetry: upper − center == center − lower, upper ≥ center ≥ lower
//! 2. Confidence clamp: every constructed confidence lies in [0, 100]
//! 3. Risk/reward: ratio == reward_pips / risk_pips, target on the profitable side
//! 4. Short-input robustness: any candle count analyzes without panicking
//! 5. Idempotence: the same snapshot analyzes to the same JSON
//! 6. Causality: extending a series never rewrites earlier derived values

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use zonelab_core::config::{AnalysisConfig, ConfigPreset, MovingAverageConfig, ZoneMethod};
use zonelab_core::domain::{Bias, Candle, Confidence, Direction, Granularity, Strength};
use zonelab_core::pipeline::{analyze_snapshot, AnalysisStatus, MarketSnapshot};
use zonelab_core::series::CandleSeries;
use zonelab_core::signal::RiskReward;
use zonelab_core::zones::{Zone, ZoneName, ZoneSizing};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (0.5..200.0_f64).prop_map(|p| (p * 10_000.0).round() / 10_000.0)
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Bullish), Just(Direction::Bearish)]
}

/// Random-walk closes turned into candles with open = previous close.
fn arb_candles(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    (1.0..1.5_f64, prop::collection::vec(-0.002..0.002_f64, 0..max_len)).prop_map(|(start, steps)| {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut close = start;
        steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let open = close;
                close = (close + step).max(0.1);
                Candle::new(
                    base + Duration::hours(i as i64),
                    open,
                    open.max(close) + 0.0004,
                    open.min(close) - 0.0004,
                    close,
                    1000.0 + (i % 7) as f64 * 150.0,
                )
            })
            .collect()
    })
}

fn snapshot(candles: Vec<Candle>) -> MarketSnapshot {
    MarketSnapshot::new("EUR_USD")
        .with(Granularity::D, candles.clone())
        .with(Granularity::H4, candles.clone())
        .with(Granularity::H1, candles)
}

// ── 1. Zone symmetry ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn zone_is_symmetric(center in arb_price(), width in 0.0..0.05_f64) {
        let zone = Zone::new(
            ZoneName::SlowMaZone,
            center,
            width,
            ZoneMethod::Fixed,
            ZoneSizing::Fixed { pips: 0.0 },
            0.0001,
        )
        .unwrap();
        prop_assert!(zone.upper() >= zone.center());
        prop_assert!(zone.center() >= zone.lower());
        let above = zone.upper() - zone.center();
        let below = zone.center() - zone.lower();
        prop_assert!((above - below).abs() < 1e-9);
        prop_assert!(zone.contains(center));
    }

    #[test]
    fn negative_width_is_rejected(center in arb_price(), width in -1.0..-1e-9_f64) {
        let result = Zone::new(
            ZoneName::FastMaZone,
            center,
            width,
            ZoneMethod::Fixed,
            ZoneSizing::Fixed { pips: 0.0 },
            0.0001,
        );
        prop_assert!(result.is_err());
    }
}

// ── 2. Confidence clamp ──────────────────────────────────────────────

proptest! {
    #[test]
    fn confidence_is_clamped(raw in prop::num::f64::ANY, delta in -500.0..500.0_f64) {
        let c = Confidence::new(raw);
        prop_assert!((0.0..=100.0).contains(&c.value()));
        let adjusted = c.adjusted(delta);
        prop_assert!((0.0..=100.0).contains(&adjusted.value()));
    }
}

// ── 3. Risk / reward ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn risk_reward_ratio_and_side(
        direction in arb_direction(),
        entry in arb_price(),
        atr_fraction in 0.0005..0.02_f64,
        risk_multiplier in 0.5..4.0_f64,
        reward_ratio in 0.5..4.0_f64,
    ) {
        let atr = entry * atr_fraction;
        let rr = RiskReward::from_atr(direction, entry, atr, risk_multiplier, reward_ratio, 0.0001).unwrap();
        prop_assert!((rr.take_profit() - entry) * direction.sign() > 0.0);
        prop_assert!((entry - rr.stop_loss()) * direction.sign() > 0.0);
        prop_assert!((rr.ratio() - rr.reward_pips() / rr.risk_pips()).abs() < 1e-9);
        prop_assert!((rr.ratio() - reward_ratio).abs() < 1e-6);
    }

    #[test]
    fn moved_stop_keeps_ratio_consistent(
        entry in arb_price(),
        stop_fraction in 0.001..0.05_f64,
        new_stop_fraction in 0.001..0.05_f64,
    ) {
        let rr = RiskReward::new(
            Direction::Bullish,
            entry,
            entry * (1.0 - stop_fraction),
            entry * 1.05,
            0.0001,
        )
        .unwrap();
        let moved = rr.with_stop_loss(entry * (1.0 - new_stop_fraction)).unwrap();
        prop_assert!((moved.ratio() - moved.reward_pips() / moved.risk_pips()).abs() < 1e-9);
        prop_assert_eq!(moved.take_profit(), rr.take_profit());
    }
}

// ── 4 & 5. Pipeline robustness and idempotence ───────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn short_input_never_panics(candles in arb_candles(40)) {
        let n = candles.len();
        let snap = snapshot(candles);
        for preset in ConfigPreset::ALL {
            let result = analyze_snapshot(&snap, &preset.to_config()).unwrap();
            prop_assert!((0.0..=100.0).contains(&result.signal.confidence.value()));
            if n == 0 {
                prop_assert_eq!(result.status, AnalysisStatus::NoData);
            } else {
                prop_assert!(result.signal.entry_price.unwrap().is_finite());
            }
        }

        // Too short for the 200-period trend MA: neutral, weak, at most 40.
        let result = analyze_snapshot(&snap, &ConfigPreset::Original.to_config()).unwrap();
        prop_assert_eq!(result.trend.bias, Bias::Neutral);
        prop_assert_eq!(result.trend.strength, Strength::Weak);
        prop_assert!(result.trend.confidence.value() <= 40.0);
        prop_assert!(result.trend.is_degraded());
    }

    #[test]
    fn analysis_is_idempotent(candles in arb_candles(120)) {
        let snap = snapshot(candles);
        let config = AnalysisConfig::default();
        let a = serde_json::to_string(&analyze_snapshot(&snap, &config).unwrap()).unwrap();
        let b = serde_json::to_string(&analyze_snapshot(&snap, &config).unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }
}

// ── 6. Causality ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn extend_matches_full_build(candles in arb_candles(80), split in 0usize..80) {
        let config = MovingAverageConfig {
            fast_period: 5,
            slow_period: 10,
            trend_period: 20,
            atr_period: 7,
            ..MovingAverageConfig::default()
        };
        let split = split.min(candles.len());
        let full = CandleSeries::build("EUR_USD", Granularity::H1, candles.clone(), &config);
        let mut partial = CandleSeries::build("EUR_USD", Granularity::H1, candles[..split].to_vec(), &config);
        partial.extend(candles[split..].iter().copied());
        prop_assert_eq!(partial.len(), full.len());
        prop_assert_eq!(partial.fast_ma(), full.fast_ma());
        prop_assert_eq!(partial.trend_ma(), full.trend_ma());
        prop_assert_eq!(partial.atr(), full.atr());
    }
}
