//! Parsed sensor series for a single channel
//!
//! A series is an ordered list of `(timestamp, value, mode)` samples. The
//! operating mode travels with each sample so that band selection never
//! depends on process-wide state.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating state of the device under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Idle,
    Run,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Idle, Mode::Run];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Run => "run",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(Mode::Idle),
            "run" | "running" => Ok(Mode::Run),
            other => Err(format!("unknown operating mode '{}'", other)),
        }
    }
}

/// One reading of the selected channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    /// NaN marks a missing reading
    pub value: f64,
    pub mode: Mode,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64, mode: Mode) -> Self {
        Self {
            timestamp,
            value,
            mode,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// Inclusive `[start, end]` timestamp window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Time series of one channel, as handed over by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Channel (column) name
    pub channel: String,
    /// Date of the test event, when the file header carried one
    pub event_date: Option<NaiveDate>,
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn new(channel: impl Into<String>, event_date: Option<NaiveDate>, samples: Vec<Sample>) -> Self {
        Self {
            channel: channel.into(),
            event_date,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Timestamps were built from time-of-day only, so ordering across
    /// midnight cannot be trusted.
    pub fn cross_midnight_unreliable(&self) -> bool {
        self.event_date.is_none()
    }

    /// Keep only samples inside `window`.
    ///
    /// Returns the reduced series together with a map from original sample
    /// index to its position in the reduced series (`None` when dropped).
    pub fn restrict(&self, window: &TimeWindow) -> (TimeSeries, Vec<Option<usize>>) {
        let mut kept = Vec::new();
        let mut index_map = Vec::with_capacity(self.samples.len());

        for sample in &self.samples {
            if window.contains(sample.timestamp) {
                index_map.push(Some(kept.len()));
                kept.push(*sample);
            } else {
                index_map.push(None);
            }
        }

        let reduced = TimeSeries {
            channel: self.channel.clone(),
            event_date: self.event_date,
            samples: kept,
        };
        (reduced, index_map)
    }
}
