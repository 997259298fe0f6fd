//! Named configuration presets.
//!
//! Each preset is a builder over `AnalysisConfig::default()`: it swaps the four
//! method selectors and the few parameters the preset is known for. Calling
//! `to_config` always returns a fresh value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    AnalysisConfig, ConfigError, EntryMethod, PriceActionMethod, TrendMethod, ZoneMethod,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPreset {
    /// Immediate entries, MA alignment, fixed-width zones, basic patterns.
    Original,
    /// Demands confluence everywhere and wide ATR zones.
    Conservative,
    /// Fires on a single confirmation with tight zones.
    Aggressive,
    /// Middle ground between the two.
    Balanced,
}

impl ConfigPreset {
    pub const ALL: [ConfigPreset; 4] = [
        Self::Original,
        Self::Conservative,
        Self::Aggressive,
        Self::Balanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Conservative => "conservative",
            Self::Aggressive => "aggressive",
            Self::Balanced => "balanced",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Original => "immediate entries on MA alignment with fixed 15-pip zones",
            Self::Conservative => "confluence-confirmed entries, composite trend and zones",
            Self::Aggressive => "zone rejections on MA alignment with tight ATR zones",
            Self::Balanced => "zone rejections, composite trend, volatility-adaptive zones",
        }
    }

    pub fn to_config(self) -> AnalysisConfig {
        let base = AnalysisConfig::default();
        match self {
            Self::Original => base.with_methods(
                TrendMethod::MaAlignment,
                ZoneMethod::Fixed,
                PriceActionMethod::BasicPatterns,
                EntryMethod::Immediate,
            ),
            Self::Conservative => {
                let mut config = base.with_methods(
                    TrendMethod::CompositeTrend,
                    ZoneMethod::CompositeZones,
                    PriceActionMethod::Comprehensive,
                    EntryMethod::ConfluenceConfirmation,
                );
                config.entry.min_confirmations = 3;
                config.zones.atr_multiplier = 1.0;
                config
            }
            Self::Aggressive => {
                let mut config = base.with_methods(
                    TrendMethod::MaAlignment,
                    ZoneMethod::AtrBased,
                    PriceActionMethod::BasicPatterns,
                    EntryMethod::ZoneRejection,
                );
                config.entry.min_confirmations = 1;
                config.zones.atr_multiplier = 0.5;
                config
            }
            Self::Balanced => {
                let mut config = base.with_methods(
                    TrendMethod::CompositeTrend,
                    ZoneMethod::VolatilityAdaptive,
                    PriceActionMethod::ReversalPatterns,
                    EntryMethod::ZoneRejection,
                );
                config.entry.min_confirmations = 2;
                config.zones.atr_multiplier = 0.75;
                config
            }
        }
    }
}

impl fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| ConfigError::UnknownMethod {
                component: "preset",
                name: s.to_string(),
            })
    }
}
