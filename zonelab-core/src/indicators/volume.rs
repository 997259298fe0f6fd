//! Volume context for the execution timeframe.

use serde::{Deserialize, Serialize};

use super::sma_of_series;
use crate::domain::Candle;

/// Snapshot of recent volume behaviour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// False when the feed reports no volume at all.
    pub has_volume: bool,
    pub current_volume: f64,
    /// Volume moving average at the latest candle, if enough history.
    pub average_volume: Option<f64>,
    pub is_spike: bool,
    /// Spikes among the last five candles.
    pub recent_spikes: usize,
    /// current / average; 0 when the average is unavailable or zero.
    pub volume_ratio: f64,
}

/// Compute the volume profile with a `lookback`-period volume average and a
/// spike threshold of `average × spike_multiplier`.
pub fn volume_profile(candles: &[Candle], lookback: usize, spike_multiplier: f64) -> VolumeProfile {
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
    if volumes.iter().sum::<f64>() <= 0.0 {
        return VolumeProfile::default();
    }

    let averages = sma_of_series(&volumes, lookback);
    let is_spike_at = |i: usize| match averages[i] {
        Some(avg) => volumes[i] > avg * spike_multiplier,
        None => false,
    };

    let last = volumes.len() - 1;
    let average_volume = averages[last];
    let recent_spikes = (volumes.len().saturating_sub(5)..volumes.len())
        .filter(|&i| is_spike_at(i))
        .count();
    let volume_ratio = match average_volume {
        Some(avg) if avg > 0.0 => volumes[last] / avg,
        _ => 0.0,
    };

    VolumeProfile {
        has_volume: true,
        current_volume: volumes[last],
        average_volume,
        is_spike: is_spike_at(last),
        recent_spikes,
        volume_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn no_volume_feed() {
        let mut candles = make_candles(&[1.0, 2.0, 3.0]);
        for c in &mut candles {
            c.volume = 0.0;
        }
        let profile = volume_profile(&candles, 2, 1.5);
        assert!(!profile.has_volume);
        assert!(!profile.is_spike);
    }

    #[test]
    fn empty_input_has_no_volume() {
        assert_eq!(volume_profile(&[], 20, 1.5), VolumeProfile::default());
    }

    #[test]
    fn detects_spike_on_last_candle() {
        let mut candles = make_candles(&[1.0; 6]);
        candles[5].volume = 5000.0;
        // average over last 3 = (1000 + 1000 + 5000) / 3 ≈ 2333; 5000 > 3500
        let profile = volume_profile(&candles, 3, 1.5);
        assert!(profile.has_volume);
        assert!(profile.is_spike);
        assert_eq!(profile.recent_spikes, 1);
        assert!(profile.volume_ratio > 2.0);
    }

    #[test]
    fn short_history_has_no_average() {
        let candles = make_candles(&[1.0, 2.0]);
        let profile = volume_profile(&candles, 20, 1.5);
        assert!(profile.has_volume);
        assert_eq!(profile.average_volume, None);
        assert_eq!(profile.volume_ratio, 0.0);
    }
}
