//! Text and JSON rendering of run results

use crate::alert::Severity;
use crate::pipeline::FileAnalysis;
use crate::run::RunResult;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// One grouped alert resolved against its sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonAlert {
    /// Sample index within the (possibly window-restricted) series
    pub index: usize,
    pub timestamp: NaiveDateTime,
    /// `None` for a missing reading
    pub value: Option<f64>,
    pub severity: Severity,
}

/// Per-file section of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFile {
    pub channel: String,
    pub event_date: Option<NaiveDate>,
    /// Whether timestamps lack a date and may misorder across midnight
    pub cross_midnight_unreliable: bool,
    pub samples: usize,
    pub alerts: Vec<JsonAlert>,
}

/// Complete run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    pub alert_counts: BTreeMap<Severity, usize>,
    pub total_alerts: usize,
    pub files: BTreeMap<String, JsonFile>,
}

fn resolve_alerts(analysis: &FileAnalysis) -> Vec<JsonAlert> {
    analysis
        .alerts
        .iter()
        .filter_map(|alert| {
            let sample = analysis.series.get(alert.alert_index)?;
            Some(JsonAlert {
                index: alert.alert_index,
                timestamp: sample.timestamp,
                value: (!sample.is_missing()).then_some(sample.value),
                severity: alert.severity,
            })
        })
        .collect()
}

impl From<&RunResult> for JsonReport {
    fn from(result: &RunResult) -> Self {
        let files = result
            .alert_data
            .iter()
            .map(|(name, analysis)| {
                let file = JsonFile {
                    channel: analysis.series.channel.clone(),
                    event_date: analysis.event_date,
                    cross_midnight_unreliable: analysis.series.cross_midnight_unreliable(),
                    samples: analysis.series.len(),
                    alerts: resolve_alerts(analysis),
                };
                (name.clone(), file)
            })
            .collect();

        JsonReport {
            alert_counts: result.alert_counts.clone(),
            total_alerts: result.total_alerts(),
            files,
        }
    }
}

/// Pretty-printed JSON report
pub fn render_json(result: &RunResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport::from(result))
}

/// Severity table followed by the alerts of each file
pub fn render_text(result: &RunResult) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "severity      alerts");
    let _ = writeln!(out, "--------- ----------");
    for severity in Severity::ALL {
        let count = result.alert_counts.get(&severity).copied().unwrap_or(0);
        let _ = writeln!(out, "{:<9} {:>10}", severity, count);
    }
    let _ = writeln!(out, "--------- ----------");
    let _ = writeln!(out, "{:<9} {:>10}", "total", result.total_alerts());

    for (name, analysis) in &result.alert_data {
        let _ = writeln!(out);
        let date = analysis
            .event_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        let _ = writeln!(
            out,
            "{} [{}, {} samples, {}]",
            name,
            analysis.series.channel,
            analysis.series.len(),
            date
        );

        let alerts = resolve_alerts(analysis);
        if alerts.is_empty() {
            let _ = writeln!(out, "  no alerts");
        }
        for alert in alerts {
            let value = alert
                .value
                .map(|v| format!("{:.3}", v))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  {:>6}  {}  {:>12}  {}",
                alert.index, alert.timestamp, value, alert.severity
            );
        }
    }

    out
}
