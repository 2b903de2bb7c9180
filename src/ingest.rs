//! Sensor log ingestion
//!
//! The analysis core only needs a parsed [`TimeSeries`]; [`SeriesLoader`] is
//! the seam to whatever produces one. [`CsvSeriesLoader`] reads the burn-in
//! logger format:
//!
//! ```text
//! Burn-in log, chamber 3, started 2024-03-01      <- event date somewhere in line 1
//! <free text>
//! <free text>
//! Time,Temp,Voltage,Mode                          <- column header
//! 08:00:00,25.1,3.30,idle
//! 08:00:01,25.3,3.31,run
//! ```
//!
//! The `Mode` (or `State`) column is optional; without it every sample takes
//! the loader's default mode. Without an event date, timestamps are anchored
//! on 1970-01-01 and the series reports unreliable cross-midnight ordering.

use crate::error::{AnalysisError, Result};
use crate::series::{Mode, Sample, TimeSeries};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Produces a parsed series for one channel of one file
pub trait SeriesLoader {
    fn load(&self, path: &Path, selected_variable: &str, default_mode: Mode) -> Result<TimeSeries>;
}

/// Loader for the burn-in CSV log format
#[derive(Debug, Clone)]
pub struct CsvSeriesLoader {
    /// Lines preceding the column header
    pub preamble_lines: usize,
    pub time_column: String,
    pub mode_columns: Vec<String>,
}

impl Default for CsvSeriesLoader {
    fn default() -> Self {
        Self {
            preamble_lines: 3,
            time_column: "Time".to_string(),
            mode_columns: vec!["Mode".to_string(), "State".to_string()],
        }
    }
}

impl SeriesLoader for CsvSeriesLoader {
    fn load(&self, path: &Path, selected_variable: &str, default_mode: Mode) -> Result<TimeSeries> {
        let content = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &content, selected_variable, default_mode)
    }
}

impl CsvSeriesLoader {
    /// Parse log content; `path` is only used for error reporting
    pub fn parse(
        &self,
        path: &Path,
        content: &str,
        selected_variable: &str,
        default_mode: Mode,
    ) -> Result<TimeSeries> {
        let malformed = |line: usize, reason: String| AnalysisError::Malformed {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut lines = content.lines().enumerate();

        let event_date = content.lines().next().and_then(extract_date);
        if event_date.is_none() {
            tracing::warn!(
                path = %path.display(),
                "no event date in header, cross-midnight ordering is unreliable"
            );
        }
        let anchor = event_date.unwrap_or_default();

        let header = lines
            .by_ref()
            .nth(self.preamble_lines)
            .map(|(_, line)| split_record(line))
            .ok_or_else(|| malformed(self.preamble_lines + 1, "missing column header".to_string()))?;

        let column = |name: &str| header.iter().position(|h| h == name);
        let missing = |name: &str| AnalysisError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        };
        let time_idx = column(self.time_column.as_str()).ok_or_else(|| missing(self.time_column.as_str()))?;
        let value_idx = column(selected_variable).ok_or_else(|| missing(selected_variable))?;
        let mode_idx = self.mode_columns.iter().find_map(|name| column(name.as_str()));

        let mut samples = Vec::new();
        for (line_no, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_record(line);
            let field = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");
            let line_no = line_no + 1;

            let time = parse_time(field(time_idx))
                .ok_or_else(|| malformed(line_no, format!("invalid time '{}'", field(time_idx))))?;

            let raw_value = field(value_idx);
            let value = if raw_value.is_empty() {
                f64::NAN
            } else {
                raw_value
                    .parse::<f64>()
                    .map_err(|_| malformed(line_no, format!("invalid value '{}'", raw_value)))?
            };

            let mode = match mode_idx.map(field) {
                Some(raw) if !raw.is_empty() => raw.parse::<Mode>().map_err(|e| malformed(line_no, e))?,
                _ => default_mode,
            };

            samples.push(Sample::new(anchor.and_time(time), value, mode));
        }

        tracing::debug!(
            path = %path.display(),
            channel = selected_variable,
            samples = samples.len(),
            ?event_date,
            "series loaded"
        );
        Ok(TimeSeries::new(selected_variable, event_date, samples))
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S%.f"))
        .ok()
}

/// Split one CSV record, honoring double-quoted fields
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn ymd_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").expect("valid date regex")
    })
}

fn dmy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})[./](\d{1,2})[./](\d{4})\b").expect("valid date regex")
    })
}

/// Find the first valid calendar date in a free-text header line.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `DD/MM/YYYY` and `DD.MM.YYYY`.
pub fn extract_date(line: &str) -> Option<NaiveDate> {
    let num = |caps: &regex::Captures<'_>, i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    let ymd = ymd_pattern().captures_iter(line).find_map(|caps| {
        NaiveDate::from_ymd_opt(num(&caps, 1)? as i32, num(&caps, 2)?, num(&caps, 3)?)
    });
    ymd.or_else(|| {
        dmy_pattern().captures_iter(line).find_map(|caps| {
            NaiveDate::from_ymd_opt(num(&caps, 3)? as i32, num(&caps, 2)?, num(&caps, 1)?)
        })
    })
}
