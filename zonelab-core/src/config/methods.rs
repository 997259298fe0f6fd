//! Method selectors for the four polymorphic analysis stages.
//!
//! Wire names are SCREAMING_SNAKE_CASE. Parsing is case-insensitive and
//! accepts `-` or spaces for `_`; anything else is `ConfigError::UnknownMethod`,
//! whether it arrives through `FromStr` or through deserialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ConfigError;

fn normalize_method_name(name: &str) -> String {
    name.trim().to_ascii_uppercase().replace(['-', ' '], "_")
}

macro_rules! method_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $component:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Component label used in error messages.
            pub const COMPONENT: &'static str = $component;

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = normalize_method_name(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|m| m.as_str() == key)
                    .ok_or_else(|| ConfigError::UnknownMethod {
                        component: $component,
                        name: s.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                name.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

method_enum! {
    /// Trend classification method.
    TrendMethod, "trend" {
        /// Three pairwise MA/price comparisons.
        MaAlignment => "MA_ALIGNMENT",
        /// ATR-normalised regression slopes of the MAs and price.
        SlopeAnalysis => "SLOPE_ANALYSIS",
        /// Swing-high / swing-low sequence.
        MarketStructure => "MARKET_STRUCTURE",
        /// ROC + RSI + raw momentum buckets.
        MomentumTrend => "MOMENTUM_TREND",
        /// Weighted MA alignment across timeframes.
        MultiTimeframe => "MULTI_TIMEFRAME",
        /// Majority vote over the other methods.
        CompositeTrend => "COMPOSITE_TREND",
    }
}

method_enum! {
    /// Zone width sizing method.
    ZoneMethod, "zone" {
        Fixed => "FIXED",
        AtrBased => "ATR_BASED",
        VolatilityAdaptive => "VOLATILITY_ADAPTIVE",
        TrendAdaptive => "TREND_ADAPTIVE",
        MarketCondition => "MARKET_CONDITION",
        CompositeZones => "COMPOSITE_ZONES",
    }
}

method_enum! {
    /// Price-action analysis method.
    PriceActionMethod, "price action" {
        BasicPatterns => "BASIC_PATTERNS",
        ReversalPatterns => "REVERSAL_PATTERNS",
        ContinuationPatterns => "CONTINUATION_PATTERNS",
        MomentumPatterns => "MOMENTUM_PATTERNS",
        ConfluencePatterns => "CONFLUENCE_PATTERNS",
        Comprehensive => "COMPREHENSIVE",
    }
}

method_enum! {
    /// Entry timing method.
    EntryMethod, "entry timing" {
        Immediate => "IMMEDIATE",
        ZoneRejection => "ZONE_REJECTION",
        PullbackCompletion => "PULLBACK_COMPLETION",
        BreakoutRetest => "BREAKOUT_RETEST",
        ConfluenceConfirmation => "CONFLUENCE_CONFIRMATION",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lenient_about_case_and_separators() {
        assert_eq!("ma_alignment".parse::<TrendMethod>().unwrap(), TrendMethod::MaAlignment);
        assert_eq!("atr-based".parse::<ZoneMethod>().unwrap(), ZoneMethod::AtrBased);
        assert_eq!(
            " Zone Rejection ".parse::<EntryMethod>().unwrap(),
            EntryMethod::ZoneRejection
        );
    }

    #[test]
    fn unknown_name_is_explicit_error() {
        let err = "FIBONACCI".parse::<TrendMethod>().unwrap_err();
        match err {
            ConfigError::UnknownMethod { component, name } => {
                assert_eq!(component, "trend");
                assert_eq!(name, "FIBONACCI");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&PriceActionMethod::Comprehensive).unwrap();
        assert_eq!(json, "\"COMPREHENSIVE\"");
        let back: PriceActionMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PriceActionMethod::Comprehensive);
        assert!(serde_json::from_str::<EntryMethod>("\"LIMIT\"").is_err());
    }

    #[test]
    fn every_variant_round_trips_through_its_name() {
        for m in TrendMethod::ALL {
            assert_eq!(m.as_str().parse::<TrendMethod>().unwrap(), *m);
        }
        for m in ZoneMethod::ALL {
            assert_eq!(m.as_str().parse::<ZoneMethod>().unwrap(), *m);
        }
        for m in PriceActionMethod::ALL {
            assert_eq!(m.as_str().parse::<PriceActionMethod>().unwrap(), *m);
        }
        for m in EntryMethod::ALL {
            assert_eq!(m.as_str().parse::<EntryMethod>().unwrap(), *m);
        }
    }
}
