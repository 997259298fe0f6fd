//! Configuration fingerprinting.
//!
//! Every `AnalysisResult` carries the blake3 hash of the canonical JSON form
//! of the configuration that produced it, so a notifier can key deduplication
//! on (instrument, config hash, signal) and an audit can tell which settings
//! were live. Struct fields serialize in declaration order and every map is a
//! `BTreeMap`, so equal configs always hash equally.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AnalysisConfig;

/// Hex-encoded blake3 digest of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigHash(String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines and report headers.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of the canonical JSON serialization of `config`.
pub fn config_hash(config: &AnalysisConfig) -> ConfigHash {
    let canonical = match serde_json::to_vec(config) {
        Ok(bytes) => bytes,
        // Unreachable for the shipped config types; hash the debug form instead.
        Err(_) => format!("{config:?}").into_bytes(),
    };
    ConfigHash::from_bytes(&canonical)
}
