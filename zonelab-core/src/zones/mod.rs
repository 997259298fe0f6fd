//! Zone construction around the latest moving-average values.
//!
//! Each defined MA becomes the center of a symmetric band whose half-width
//! comes from a [`ZoneSizer`]. Touch and rejection counts over recent candles
//! grade the zone's quality.

pub mod atr_based;
pub mod composite;
pub mod fixed;
pub mod market_condition;
pub mod metadata;
pub mod trend_adaptive;
pub mod volatility;

pub use atr_based::AtrBased;
pub use composite::CompositeZones;
pub use fixed::FixedWidth;
pub use market_condition::{MarketCondition, MarketConditionSizer};
pub use metadata::{zone_metadata, ZoneMetadata};
pub use trend_adaptive::TrendAdaptive;
pub use volatility::{VolatilityAdaptive, VolatilityRegime};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::config::{ZoneConfig, ZoneMethod};
use crate::domain::{Candle, Strength};
use crate::series::CandleSeries;
use crate::trend::TrendAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneName {
    FastMaZone,
    SlowMaZone,
    TrendMaZone,
}

impl ZoneName {
    pub const ALL: [ZoneName; 3] = [Self::FastMaZone, Self::SlowMaZone, Self::TrendMaZone];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FastMaZone => "fast_ma_zone",
            Self::SlowMaZone => "slow_ma_zone",
            Self::TrendMaZone => "trend_ma_zone",
        }
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneQuality {
    #[default]
    Low,
    Medium,
    High,
}

/// How a zone's half-width was derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneSizing {
    Fixed {
        pips: f64,
    },
    Atr {
        atr: f64,
        multiplier: f64,
    },
    Volatility {
        regime: VolatilityRegime,
        percentile: f64,
        atr_slope: f64,
        multiplier: f64,
    },
    TrendAdaptive {
        strength: Option<Strength>,
        multiplier: f64,
        base_width: f64,
    },
    MarketCondition {
        condition: MarketCondition,
        efficiency: f64,
        r_squared: f64,
        multiplier: f64,
        base_width: f64,
    },
    Composite {
        atr_width: f64,
        volatility_width: f64,
        market_width: f64,
    },
}

/// Half-width produced by a sizer together with its derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedWidth {
    pub half_width: f64,
    pub sizing: ZoneSizing,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("zone center must be finite, got {0}")]
    InvalidCenter(f64),
    #[error("zone width must be finite and non-negative, got {0}")]
    InvalidWidth(f64),
}

/// A symmetric price band. Fields are private so the band can only be built
/// through [`Zone::new`], which keeps `upper = center + width` and
/// `lower = center − width`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    name: ZoneName,
    center: f64,
    upper: f64,
    lower: f64,
    width: f64,
    width_pips: f64,
    method: ZoneMethod,
    sizing: ZoneSizing,
    touches: usize,
    rejections: usize,
    quality: ZoneQuality,
}

impl Zone {
    pub fn new(
        name: ZoneName,
        center: f64,
        width: f64,
        method: ZoneMethod,
        sizing: ZoneSizing,
        pip_size: f64,
    ) -> Result<Self, ZoneError> {
        if !center.is_finite() {
            return Err(ZoneError::InvalidCenter(center));
        }
        if !width.is_finite() || width < 0.0 {
            return Err(ZoneError::InvalidWidth(width));
        }
        let width_pips = if pip_size > 0.0 { width / pip_size } else { 0.0 };
        Ok(Self {
            name,
            center,
            upper: center + width,
            lower: center - width,
            width,
            width_pips,
            method,
            sizing,
            touches: 0,
            rejections: 0,
            quality: ZoneQuality::Low,
        })
    }

    pub fn with_metadata(mut self, metadata: ZoneMetadata) -> Self {
        self.touches = metadata.touches;
        self.rejections = metadata.rejections;
        self.quality = metadata.quality;
        self
    }

    pub fn name(&self) -> ZoneName {
        self.name
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Half-width: distance from center to either boundary.
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn width_pips(&self) -> f64 {
        self.width_pips
    }

    pub fn method(&self) -> ZoneMethod {
        self.method
    }

    pub fn sizing(&self) -> &ZoneSizing {
        &self.sizing
    }

    pub fn touches(&self) -> usize {
        self.touches
    }

    pub fn rejections(&self) -> usize {
        self.rejections
    }

    pub fn quality(&self) -> ZoneQuality {
        self.quality
    }

    /// upper − lower.
    pub fn height(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower && price <= self.upper
    }

    /// Whether a candle's range overlaps the band.
    pub fn touched_by(&self, candle: &Candle) -> bool {
        candle.low <= self.upper && candle.high >= self.lower
    }

    /// MEDIUM or better quality with `price` inside the band.
    pub fn is_active(&self, price: f64) -> bool {
        self.quality >= ZoneQuality::Medium && self.contains(price)
    }
}

/// Inputs to a zone sizer.
#[derive(Debug, Clone, Copy)]
pub struct ZoneContext<'a> {
    pub series: &'a CandleSeries,
    pub config: &'a ZoneConfig,
    pub trend: Option<&'a TrendAnalysis>,
    pub pip_size: f64,
}

/// Trait for zone width strategies.
pub trait ZoneSizer: Send + Sync {
    fn method(&self) -> ZoneMethod;

    fn half_width(&self, ctx: &ZoneContext<'_>) -> SizedWidth;
}

/// Zones built for one series, plus the names that had no defined MA.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneBuild {
    pub zones: Vec<Zone>,
    pub omitted: Vec<ZoneName>,
}

impl ZoneBuild {
    pub fn active(&self, price: f64) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(move |z| z.is_active(price))
    }
}

/// Build one zone per defined latest MA of `series`.
pub fn build_zones(
    sizer: &dyn ZoneSizer,
    series: &CandleSeries,
    config: &ZoneConfig,
    trend: Option<&TrendAnalysis>,
    pip_size: f64,
) -> ZoneBuild {
    let Some(snap) = series.snapshot() else {
        return ZoneBuild {
            zones: Vec::new(),
            omitted: ZoneName::ALL.to_vec(),
        };
    };

    let ctx = ZoneContext {
        series,
        config,
        trend,
        pip_size,
    };
    let sized = sizer.half_width(&ctx);
    let recent = series.tail(config.metadata.lookback);

    let mut build = ZoneBuild {
        zones: Vec::with_capacity(3),
        omitted: Vec::new(),
    };
    let centers = [
        (ZoneName::FastMaZone, snap.fast_ma),
        (ZoneName::SlowMaZone, snap.slow_ma),
        (ZoneName::TrendMaZone, snap.trend_ma),
    ];
    for (name, center) in centers {
        let zone = center.ok_or_else(|| "moving average undefined".to_string()).and_then(|c| {
            Zone::new(name, c, sized.half_width, sizer.method(), sized.sizing.clone(), pip_size)
                .map_err(|e| e.to_string())
        });
        match zone {
            Ok(zone) => {
                let metadata = zone_metadata(recent, &zone, &config.metadata);
                build.zones.push(zone.with_metadata(metadata));
            }
            Err(reason) => {
                debug!(zone = %name, instrument = series.instrument(), %reason, "zone omitted");
                build.omitted.push(name);
            }
        }
    }
    build
}

/// ATR multiplier width shared by the adaptive sizers; FIXED when ATR is unusable.
pub(crate) fn atr_width(ctx: &ZoneContext<'_>) -> SizedWidth {
    AtrBased.half_width(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Granularity;
    use crate::trend::test_support::*;

    #[test]
    fn zone_is_symmetric() {
        let zone = Zone::new(
            ZoneName::FastMaZone,
            1.1,
            0.0015,
            ZoneMethod::Fixed,
            ZoneSizing::Fixed { pips: 15.0 },
            0.0001,
        )
        .unwrap();
        assert_eq!(zone.upper(), 1.1 + 0.0015);
        assert_eq!(zone.lower(), 1.1 - 0.0015);
        assert!((zone.width_pips() - 15.0).abs() < 1e-9);
        assert!(zone.contains(1.1));
        assert!(!zone.contains(1.2));
    }

    #[test]
    fn zone_rejects_bad_width() {
        let make = |w| Zone::new(ZoneName::SlowMaZone, 1.0, w, ZoneMethod::Fixed, ZoneSizing::Fixed { pips: 0.0 }, 0.0001);
        assert_eq!(make(-1.0), Err(ZoneError::InvalidWidth(-1.0)));
        assert!(make(f64::NAN).is_err());
        assert!(make(0.0).is_ok());
    }

    #[test]
    fn builds_one_zone_per_defined_ma() {
        let series = series_from_closes(Granularity::H4, &trending_closes(210, 100.0, 0.1));
        let build = build_zones(&FixedWidth, &series, &ZoneConfig::default(), None, 0.01);
        assert_eq!(build.zones.len(), 3);
        assert!(build.omitted.is_empty());
        let names: Vec<_> = build.zones.iter().map(|z| z.name()).collect();
        assert_eq!(names, ZoneName::ALL.to_vec());
    }

    #[test]
    fn undefined_ma_omits_zone() {
        let series = series_from_closes(Granularity::H4, &trending_closes(60, 100.0, 0.1));
        let build = build_zones(&FixedWidth, &series, &ZoneConfig::default(), None, 0.01);
        assert_eq!(build.zones.len(), 2);
        assert_eq!(build.omitted, vec![ZoneName::TrendMaZone]);
    }

    #[test]
    fn empty_series_has_no_zones() {
        let series = series_from_closes(Granularity::H4, &[]);
        let build = build_zones(&FixedWidth, &series, &ZoneConfig::default(), None, 0.01);
        assert!(build.zones.is_empty());
        assert_eq!(build.omitted.len(), 3);
    }
}
