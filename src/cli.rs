//! CLI argument parsing for bandwatch

use crate::series::{Mode, TimeWindow};
use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Timestamp format accepted by `--start` and `--end`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output format for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Text,
    /// JSON document for machine parsing
    Json,
}

/// Operating mode assumed for files without a mode column
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Idle,
    Run,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Idle => Mode::Idle,
            ModeArg::Run => Mode::Run,
        }
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM:SS\": {}", e))
}

#[derive(Parser, Debug)]
#[command(name = "bandwatch")]
#[command(version)]
#[command(about = "Band and 3-sigma alert analysis for burn-in sensor runs", long_about = None)]
pub struct Cli {
    /// Run directory containing the sensor log files
    #[arg(value_name = "RUN_DIR")]
    pub run_dir: PathBuf,

    /// TOML file with the idle and run band sets
    #[arg(short, long, value_name = "FILE")]
    pub bands: PathBuf,

    /// Channel (column) to analyze
    #[arg(short, long, value_name = "NAME")]
    pub variable: String,

    /// Consecutive non-normal samples tolerated before an alert is reported
    #[arg(long = "outlier-tolerance", value_name = "N", default_value = "2")]
    pub outlier_tolerance: usize,

    /// Maximum gap in seconds between alerts grouped into one event
    #[arg(long = "grouping-window", value_name = "SECS", default_value = "60")]
    pub grouping_window: u64,

    /// Deviation multiple for the 3-sigma detector
    #[arg(long = "anomaly-threshold", value_name = "K", default_value = "3.0")]
    pub anomaly_threshold: f64,

    /// Start of the reporting window ("YYYY-MM-DD HH:MM:SS")
    #[arg(long, value_name = "TS", value_parser = parse_timestamp, requires = "end")]
    pub start: Option<NaiveDateTime>,

    /// End of the reporting window ("YYYY-MM-DD HH:MM:SS")
    #[arg(long, value_name = "TS", value_parser = parse_timestamp, requires = "start")]
    pub end: Option<NaiveDateTime>,

    /// Cache root directory
    #[arg(long = "cache-dir", value_name = "DIR", default_value = ".bandwatch-cache")]
    pub cache_dir: PathBuf,

    /// Mode for files without a Mode/State column
    #[arg(long, value_enum, default_value = "run")]
    pub mode: ModeArg,

    /// Substring selecting the files of a run
    #[arg(long, value_name = "MARKER", default_value = "HTOL")]
    pub marker: String,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Do not print per-file progress to stderr
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Reporting window, when both ends were given
    pub fn window(&self) -> Option<TimeWindow> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
            _ => None,
        }
    }
}
