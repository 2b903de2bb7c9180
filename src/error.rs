//! Error taxonomy for band analysis
//!
//! Configuration problems are fatal and surface before any file is touched.
//! Per-file problems (missing channel, unreadable or malformed file) only
//! cause that file to be skipped by the run loop.

use crate::series::Mode;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid analysis configuration (band sets or hyperparameters)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid {mode} band set: {reason}")]
    InvalidBands { mode: Mode, reason: String },

    #[error("invalid hyperparameter `{name}`: {reason}")]
    InvalidHyperparameter { name: &'static str, reason: String },

    #[error("failed to load band definitions from {path}: {reason}")]
    BandsFile { path: PathBuf, reason: String },

    #[error("cannot fingerprint value: {reason}")]
    Unhashable { reason: String },
}

/// Errors raised while analyzing a single series file
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("column `{column}` missing from {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed series {} at line {line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl AnalysisError {
    /// Whether this error must abort the whole run rather than skip one file
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::Config(_))
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
