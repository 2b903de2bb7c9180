//! Temporal deduplication of raw alerts
//!
//! Raw alerts of one detector are swept in timestamp order. An alert joins the
//! open group when it lies within the grouping window of the group's *last*
//! absorbed alert, so closely spaced alerts chain into a single event even if
//! the event as a whole spans more than one window. Each group is reduced to
//! its most severe member, ties going to the earliest.
//!
//! Band alerts and 3-sigma alerts are grouped separately and never merged,
//! keeping each detection method auditable on its own.

use crate::alert::{AlertSource, GroupedAlert, RawAlert, Severity};
use crate::error::ConfigError;
use crate::series::TimeSeries;
use chrono::{NaiveDateTime, TimeDelta};
use std::time::Duration;

/// Sliding-window alert grouper
#[derive(Debug, Clone, Copy)]
pub struct AlertGrouper {
    window: TimeDelta,
}

#[derive(Debug)]
struct OpenGroup {
    last_seen: NaiveDateTime,
    representative: usize,
    severity: Severity,
    members: usize,
}

impl AlertGrouper {
    pub fn new(window: Duration) -> Result<Self, ConfigError> {
        let window = TimeDelta::from_std(window).map_err(|_| ConfigError::InvalidHyperparameter {
            name: "grouping_time_window",
            reason: format!("{:?} is out of range", window),
        })?;
        Ok(Self { window })
    }

    /// Group raw alerts of both sources; band groups come first.
    ///
    /// Alerts pointing outside the series are ignored.
    pub fn group(&self, series: &TimeSeries, raw_alerts: &[RawAlert]) -> Vec<GroupedAlert> {
        let mut grouped = self.group_source(series, raw_alerts, AlertSource::Band);
        grouped.extend(self.group_source(series, raw_alerts, AlertSource::ThreeSigma));
        grouped
    }

    fn group_source(
        &self,
        series: &TimeSeries,
        raw_alerts: &[RawAlert],
        source: AlertSource,
    ) -> Vec<GroupedAlert> {
        let mut timed: Vec<(NaiveDateTime, &RawAlert)> = raw_alerts
            .iter()
            .filter(|a| a.source == source)
            .filter_map(|a| match series.get(a.sample_index) {
                Some(sample) => Some((sample.timestamp, a)),
                None => {
                    tracing::warn!(
                        index = a.sample_index,
                        len = series.len(),
                        "dropping alert outside series"
                    );
                    None
                }
            })
            .collect();
        timed.sort_by_key(|(ts, a)| (*ts, a.sample_index));

        let mut grouped = Vec::new();
        let mut open: Option<OpenGroup> = None;

        for (timestamp, alert) in timed {
            match open.as_mut() {
                Some(group) if timestamp - group.last_seen <= self.window => {
                    group.last_seen = timestamp;
                    group.members += 1;
                    // Strictly greater keeps the earliest member on ties
                    if alert.severity > group.severity {
                        group.representative = alert.sample_index;
                        group.severity = alert.severity;
                    }
                }
                _ => {
                    if let Some(done) = open.take() {
                        grouped.push(close(done));
                    }
                    open = Some(OpenGroup {
                        last_seen: timestamp,
                        representative: alert.sample_index,
                        severity: alert.severity,
                        members: 1,
                    });
                }
            }
        }
        if let Some(done) = open {
            grouped.push(close(done));
        }

        tracing::debug!(?source, groups = grouped.len(), "alerts grouped");
        grouped
    }
}

fn close(group: OpenGroup) -> GroupedAlert {
    tracing::trace!(
        representative = group.representative,
        members = group.members,
        severity = %group.severity,
        "closing alert group"
    );
    GroupedAlert {
        alert_index: group.representative,
        severity: group.severity,
    }
}
