//! Volatility-adaptive zones.
//!
//! percentile = (ATR − q05) / (q95 − q05) over the ATR history, clamped to [0, 1]
//! (0.5 when q95 = q05). The ATR slope is the regression slope of the last
//! `lookback` ATR values.
//! HIGH:  p > 0.8, or p > 0.6 with a rising ATR.
//! LOW:   p < 0.2, or p < 0.4 with a falling ATR.
//! Width = ATR × regime multiplier. Short history falls back to ATR-based width.

use serde::{Deserialize, Serialize};

use super::{atr_width, SizedWidth, ZoneContext, ZoneSizer, ZoneSizing};
use crate::config::{VolatilityConfig, ZoneMethod};
use crate::indicators::{last_defined, latest, linear_fit, quantile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityRegime {
    High,
    Normal,
    Low,
}

impl VolatilityRegime {
    pub fn classify(percentile: f64, atr_slope: f64) -> Self {
        if percentile > 0.8 || (percentile > 0.6 && atr_slope > 0.0) {
            Self::High
        } else if percentile < 0.2 || (percentile < 0.4 && atr_slope < 0.0) {
            Self::Low
        } else {
            Self::Normal
        }
    }

    pub fn multiplier(self, config: &VolatilityConfig) -> f64 {
        match self {
            Self::High => config.high_multiplier,
            Self::Normal => config.normal_multiplier,
            Self::Low => config.low_multiplier,
        }
    }
}

/// Position of `current` between the 5th and 95th percentiles of `history`.
pub fn atr_percentile(history: &[f64], current: f64) -> f64 {
    match (quantile(history, 0.05), quantile(history, 0.95)) {
        (Some(q05), Some(q95)) if q95 > q05 => ((current - q05) / (q95 - q05)).clamp(0.0, 1.0),
        _ => 0.5,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityAdaptive;

impl ZoneSizer for VolatilityAdaptive {
    fn method(&self) -> ZoneMethod {
        ZoneMethod::VolatilityAdaptive
    }

    fn half_width(&self, ctx: &ZoneContext<'_>) -> SizedWidth {
        let cfg = &ctx.config.volatility;
        let series = ctx.series;
        if series.len() < cfg.lookback {
            return atr_width(ctx);
        }
        let Some(atr) = latest(series.atr()).filter(|&a| a > 0.0) else {
            return atr_width(ctx);
        };

        let history = last_defined(series.atr(), series.len());
        let percentile = atr_percentile(&history, atr);
        let recent = last_defined(series.atr(), cfg.lookback);
        let atr_slope = linear_fit(&recent).map_or(0.0, |fit| fit.slope);
        let regime = VolatilityRegime::classify(percentile, atr_slope);
        let multiplier = regime.multiplier(cfg);

        SizedWidth {
            half_width: atr * multiplier,
            sizing: ZoneSizing::Volatility {
                regime,
                percentile,
                atr_slope,
                multiplier,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneConfig;
    use crate::domain::Granularity;
    use crate::indicators::assert_approx;
    use crate::trend::test_support::*;

    #[test]
    fn regime_bands() {
        assert_eq!(VolatilityRegime::classify(0.9, -1.0), VolatilityRegime::High);
        assert_eq!(VolatilityRegime::classify(0.7, 0.1), VolatilityRegime::High);
        assert_eq!(VolatilityRegime::classify(0.7, -0.1), VolatilityRegime::Normal);
        assert_eq!(VolatilityRegime::classify(0.1, 1.0), VolatilityRegime::Low);
        assert_eq!(VolatilityRegime::classify(0.3, -0.1), VolatilityRegime::Low);
        assert_eq!(VolatilityRegime::classify(0.5, 0.0), VolatilityRegime::Normal);
    }

    #[test]
    fn constant_history_is_mid_percentile() {
        assert_eq!(atr_percentile(&[2.0; 10], 2.0), 0.5);
        assert_eq!(atr_percentile(&[1.0, 2.0, 3.0], 10.0), 1.0);
    }

    #[test]
    fn steady_atr_is_normal_regime() {
        let series = series_from_closes(Granularity::H4, &trending_closes(60, 100.0, 1.0));
        let config = ZoneConfig::default();
        let sized = VolatilityAdaptive.half_width(&ZoneContext {
            series: &series,
            config: &config,
            trend: None,
            pip_size: 0.0001,
        });
        assert_approx(sized.half_width, 3.0 * 0.8, 1e-9);
        assert!(matches!(
            sized.sizing,
            ZoneSizing::Volatility {
                regime: VolatilityRegime::Normal,
                ..
            }
        ));
    }

    #[test]
    fn short_history_uses_atr_width() {
        let series = series_from_closes(Granularity::H4, &trending_closes(20, 100.0, 1.0));
        let config = ZoneConfig::default();
        let sized = VolatilityAdaptive.half_width(&ZoneContext {
            series: &series,
            config: &config,
            trend: None,
            pip_size: 0.0001,
        });
        assert!(matches!(sized.sizing, ZoneSizing::Atr { .. }));
    }
}
