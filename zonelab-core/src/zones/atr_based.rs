//! ATR-based zones: `ATR(period) × multiplier`.
//!
//! Falls back to fixed width when the series is shorter than the ATR period
//! or the latest ATR is undefined or zero.

use super::{FixedWidth, SizedWidth, ZoneContext, ZoneSizer, ZoneSizing};
use crate::config::ZoneMethod;
use crate::indicators::latest;

#[derive(Debug, Clone, Copy, Default)]
pub struct AtrBased;

impl ZoneSizer for AtrBased {
    fn method(&self) -> ZoneMethod {
        ZoneMethod::AtrBased
    }

    fn half_width(&self, ctx: &ZoneContext<'_>) -> SizedWidth {
        let series = ctx.series;
        if series.len() < series.ma_config().atr_period {
            return FixedWidth.half_width(ctx);
        }
        match latest(series.atr()) {
            Some(atr) if atr > 0.0 => {
                let multiplier = ctx.config.atr_multiplier;
                SizedWidth {
                    half_width: atr * multiplier,
                    sizing: ZoneSizing::Atr { atr, multiplier },
                }
            }
            _ => FixedWidth.half_width(ctx),
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

    fn sized(closes: &[f64]) -> SizedWidth {
        let series = series_from_closes(Granularity::H4, closes);
        let config = ZoneConfig::default();
        AtrBased.half_width(&ZoneContext {
            series: &series,
            config: &config,
            trend: None,
            pip_size: 0.0001,
        })
    }

    #[test]
    fn scales_latest_atr() {
        // Every candle spans its body plus one unit each side: TR = 3.
        let sized = sized(&trending_closes(30, 100.0, 1.0));
        assert_approx(sized.half_width, 3.0 * 0.75, 1e-9);
    }

    #[test]
    fn short_history_uses_fixed_width() {
        let sized = sized(&trending_closes(10, 100.0, 1.0));
        assert_eq!(sized.sizing, ZoneSizing::Fixed { pips: 15.0 });
    }
}
