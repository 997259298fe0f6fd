//! Confidence score clamped to [0, 100].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A confidence score. Every constructor clamps into `[0, 100]`, and
/// non-finite input becomes 0, so an out-of-range score cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const MAX: Confidence = Confidence(100.0);

    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 100.0))
        } else {
            Self(0.0)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Add a bonus (or penalty) and re-clamp.
    pub fn adjusted(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }

    /// Clamp to a lower ceiling than 100.
    pub fn capped(self, ceiling: f64) -> Self {
        Self::new(self.0.min(ceiling))
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
