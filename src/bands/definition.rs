use crate::error::ConfigError;
use crate::series::Mode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Closed interval `[lower, upper]` of one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// Tier boundaries for one operating mode
///
/// # Example TOML
/// ```toml
/// normal = { lower = 20.0, upper = 30.0 }
/// low = { lower = 15.0, upper = 35.0 }
/// medium = { lower = 10.0, upper = 40.0 }
/// high = { lower = 5.0, upper = 45.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSet {
    pub normal: Bounds,
    pub low: Bounds,
    pub medium: Bounds,
    pub high: Bounds,
}

impl BandSet {
    /// Check the nesting invariant: every tier strictly wider than the one
    /// inside it, on both sides, with finite bounds.
    pub fn validate(&self, mode: Mode) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBands { mode, reason };

        let tiers = [
            ("normal", self.normal),
            ("low", self.low),
            ("medium", self.medium),
            ("high", self.high),
        ];

        for (name, bounds) in &tiers {
            if !bounds.lower.is_finite() || !bounds.upper.is_finite() {
                return Err(invalid(format!("{} bounds must be finite", name)));
            }
            if bounds.lower >= bounds.upper {
                return Err(invalid(format!(
                    "{}.lower ({}) must be below {}.upper ({})",
                    name, bounds.lower, name, bounds.upper
                )));
            }
        }

        for pair in tiers.windows(2) {
            let (inner_name, inner) = pair[0];
            let (outer_name, outer) = pair[1];

            if outer.lower >= inner.lower {
                return Err(invalid(format!(
                    "{}.lower ({}) must be below {}.lower ({})",
                    outer_name, outer.lower, inner_name, inner.lower
                )));
            }
            if outer.upper <= inner.upper {
                return Err(invalid(format!(
                    "{}.upper ({}) must be above {}.upper ({})",
                    outer_name, outer.upper, inner_name, inner.upper
                )));
            }
        }

        Ok(())
    }
}

/// Band sets for both operating modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub idle: BandSet,
    pub run: BandSet,
}

impl Bands {
    pub fn for_mode(&self, mode: Mode) -> &BandSet {
        match mode {
            Mode::Idle => &self.idle,
            Mode::Run => &self.run,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for mode in Mode::ALL {
            self.for_mode(mode).validate(mode)?;
        }
        Ok(())
    }

    /// Parse and validate band definitions from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let bands: Bands = toml::from_str(content).map_err(|e| ConfigError::BandsFile {
            path: "<inline>".into(),
            reason: e.to_string(),
        })?;
        bands.validate()?;
        Ok(bands)
    }

    /// Load and validate band definitions from a TOML file
    ///
    /// # Errors
    /// Returns error if the file is unreadable, is not valid TOML, misses a
    /// tier, or violates the nesting invariant.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::BandsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::BandsFile { reason, .. } => ConfigError::BandsFile {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }
}
