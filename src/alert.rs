//! Alert records produced by the detectors and the grouper

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity
///
/// Band tiers order as `Low < Medium < High`. `ThreeSigma` is the fixed tag of
/// the statistical detector and is never compared against band tiers, since
/// the two sources are grouped separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "3-sigma")]
    ThreeSigma,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::ThreeSigma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::ThreeSigma => "3-sigma",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which detector raised an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertSource {
    Band,
    ThreeSigma,
}

/// Per-sample alert before deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAlert {
    pub sample_index: usize,
    pub severity: Severity,
    pub source: AlertSource,
}

impl RawAlert {
    pub fn band(sample_index: usize, severity: Severity) -> Self {
        Self {
            sample_index,
            severity,
            source: AlertSource::Band,
        }
    }

    pub fn three_sigma(sample_index: usize) -> Self {
        Self {
            sample_index,
            severity: Severity::ThreeSigma,
            source: AlertSource::ThreeSigma,
        }
    }
}

/// One representative alert per deduplicated event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedAlert {
    pub alert_index: usize,
    pub severity: Severity,
}
