//! Analysis hyperparameters and their fingerprint
//!
//! The five hyperparameters fully determine the output for a given input
//! file. They are reduced to a short, stable fingerprint that names the cache
//! namespace: changing any value moves results into a disjoint namespace
//! instead of invalidating the old one.

use crate::bands::Bands;
use crate::error::ConfigError;
use crate::grouping::AlertGrouper;
use crate::series::Mode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Number of hex characters kept from the SHA-256 digest
const FINGERPRINT_LEN: usize = 16;

/// Settings of one analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Consecutive non-normal samples tolerated before reporting
    pub outlier_tolerance: usize,
    /// Maximum gap between alerts chained into one event
    pub grouping_time_window: Duration,
    /// k in the k-sigma rule
    pub anomaly_threshold: f64,
    /// Channel (column) to analyze
    pub selected_variable: String,
    pub bands: Bands,
}

impl Hyperparameters {
    /// Reject values that would make the analysis meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold <= 0.0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "anomaly_threshold",
                reason: format!("must be a finite value > 0, got {}", self.anomaly_threshold),
            });
        }

        if self.selected_variable.trim().is_empty() {
            return Err(ConfigError::InvalidHyperparameter {
                name: "selected_variable",
                reason: "must name a channel".to_string(),
            });
        }

        AlertGrouper::new(self.grouping_time_window)?;
        self.bands.validate()
    }

    /// Deterministic fingerprint over all five fields
    ///
    /// Fields are hashed through a key-sorted JSON rendering, so the result
    /// does not depend on declaration or serialization order.
    pub fn fingerprint(&self) -> Result<Fingerprint, ConfigError> {
        Fingerprint::of(self)
    }

    /// Cache namespace for files analyzed with `default_mode`
    ///
    /// The default mode decides which band set applies to files without a
    /// mode column, so it is part of what determines a cached result.
    pub fn namespace(&self, default_mode: Mode) -> Result<Fingerprint, ConfigError> {
        Fingerprint::of(&(self, default_mode))
    }
}

/// Recursively sort object keys
fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Short hex digest naming a cache namespace or memo argument list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint any serializable value via its canonical JSON form
    ///
    /// Fails for values JSON cannot represent, such as maps with non-string
    /// keys.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConfigError> {
        let value = serde_json::to_value(value).map_err(|e| ConfigError::Unhashable {
            reason: e.to_string(),
        })?;
        let canonical = canonicalize(value).to_string();

        let digest = Sha256::digest(canonical.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(FINGERPRINT_LEN);
        Ok(Fingerprint(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
