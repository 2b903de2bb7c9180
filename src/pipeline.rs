//! Per-series analysis: classification, detection and grouping
//!
//! `Pipeline` is built once per configuration (validating bands and
//! hyperparameters up front) and then applied to any number of series.

use crate::alert::{GroupedAlert, RawAlert, Severity};
use crate::bands::BandClassifier;
use crate::detect::{OutlierFilter, SigmaDetector};
use crate::error::ConfigError;
use crate::grouping::AlertGrouper;
use crate::hyperparams::Hyperparameters;
use crate::series::{TimeSeries, TimeWindow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Analysis result of one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub series: TimeSeries,
    pub alerts: Vec<GroupedAlert>,
    pub event_date: Option<NaiveDate>,
}

impl FileAnalysis {
    /// Restrict to `window`, applied after grouping.
    ///
    /// Alerts whose representative sample falls outside the window are
    /// dropped; the remaining ones are re-indexed into the reduced series.
    pub fn restrict(&self, window: &TimeWindow) -> FileAnalysis {
        let (series, index_map) = self.series.restrict(window);
        let alerts = self
            .alerts
            .iter()
            .filter_map(|alert| {
                let new_index = index_map.get(alert.alert_index).copied().flatten()?;
                Some(GroupedAlert {
                    alert_index: new_index,
                    severity: alert.severity,
                })
            })
            .collect();

        FileAnalysis {
            series,
            alerts,
            event_date: self.event_date,
        }
    }

    /// Grouped alert counts by severity
    pub fn counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for alert in &self.alerts {
            *counts.entry(alert.severity).or_insert(0) += 1;
        }
        counts
    }
}

/// Configured detection and grouping pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: BandClassifier,
    grouper: AlertGrouper,
    outlier_tolerance: usize,
    anomaly_threshold: f64,
}

impl Pipeline {
    pub fn new(params: &Hyperparameters) -> Result<Self, ConfigError> {
        params.validate()?;

        Ok(Self {
            classifier: BandClassifier::new(params.bands)?,
            grouper: AlertGrouper::new(params.grouping_time_window)?,
            outlier_tolerance: params.outlier_tolerance,
            anomaly_threshold: params.anomaly_threshold,
        })
    }

    /// Raw alerts of both detectors, band alerts first
    pub fn raw_alerts(&self, series: &TimeSeries) -> Vec<RawAlert> {
        let mut alerts = OutlierFilter::new(&self.classifier, self.outlier_tolerance).detect(series);
        alerts.extend(SigmaDetector::new(&self.classifier, self.anomaly_threshold).detect(series));
        alerts
    }

    pub fn analyze(&self, series: TimeSeries) -> FileAnalysis {
        let raw = self.raw_alerts(&series);
        let alerts = self.grouper.group(&series, &raw);

        FileAnalysis {
            event_date: series.event_date,
            series,
            alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::{BandSet, Bands, Bounds};
    use crate::series::{Mode, Sample};
    use chrono::{NaiveDateTime, TimeDelta};
    use std::time::Duration;

    fn params(tolerance: usize, window_secs: u64) -> Hyperparameters {
        let set = BandSet {
            normal: Bounds::new(20.0, 30.0),
            low: Bounds::new(15.0, 35.0),
            medium: Bounds::new(10.0, 40.0),
            high: Bounds::new(5.0, 45.0),
        };
        Hyperparameters {
            outlier_tolerance: tolerance,
            grouping_time_window: Duration::from_secs(window_secs),
            anomaly_threshold: 3.0,
            selected_variable: "Temp".to_string(),
            bands: Bands { idle: set, run: set },
        }
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn series(values: &[f64]) -> TimeSeries {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(start() + TimeDelta::seconds(i as i64), v, Mode::Idle))
            .collect();
        TimeSeries::new("Temp", NaiveDate::from_ymd_opt(2024, 3, 1), samples)
    }

    #[test]
    fn test_invalid_params_rejected_up_front() {
        let mut p = params(2, 1);
        p.anomaly_threshold = 0.0;
        assert!(Pipeline::new(&p).is_err());
    }

    #[test]
    fn test_oscillating_series_end_to_end() {
        // 100 samples alternating 3 normal / 3 low: every low run reaches
        // tolerance + 1 and collapses into one grouped alert at 1s spacing
        let values: Vec<f64> = (0..100)
            .map(|i| if (i / 3) % 2 == 1 { 33.0 } else { 25.0 })
            .collect();
        let pipeline = Pipeline::new(&params(2, 1)).unwrap();
        let s = series(&values);

        let band_alerts: Vec<usize> = pipeline
            .raw_alerts(&s)
            .iter()
            .filter(|a| a.severity != Severity::ThreeSigma)
            .map(|a| a.sample_index)
            .collect();
        // Sample 99 starts a run the end of the series cuts to length 1
        let expected: Vec<usize> = (0..99).filter(|i| (i / 3) % 2 == 1).collect();
        assert_eq!(band_alerts, expected);

        let analysis = pipeline.analyze(s);
        let band_groups: Vec<&GroupedAlert> = analysis
            .alerts
            .iter()
            .filter(|a| a.severity == Severity::Low)
            .collect();
        // Full runs start at 3, 9, 15, ..., 93
        let full_runs = (0..100).filter(|i| i % 6 == 3 && i + 2 < 100).count();
        assert_eq!(band_groups.len(), full_runs);
        assert!(band_groups.iter().all(|g| g.alert_index % 6 == 3));
    }

    #[test]
    fn test_analyze_carries_event_date() {
        let pipeline = Pipeline::new(&params(0, 1)).unwrap();
        let analysis = pipeline.analyze(series(&[25.0, 25.0]));
        assert_eq!(analysis.event_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(analysis.alerts.is_empty());
    }

    #[test]
    fn test_restrict_drops_and_reindexes_alerts() {
        let analysis = FileAnalysis {
            series: series(&[25.0, 44.0, 25.0, 25.0, 12.0, 25.0]),
            alerts: vec![
                GroupedAlert {
                    alert_index: 1,
                    severity: Severity::High,
                },
                GroupedAlert {
                    alert_index: 4,
                    severity: Severity::Medium,
                },
            ],
            event_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        };
        let window = TimeWindow::new(
            start() + TimeDelta::seconds(2),
            start() + TimeDelta::seconds(5),
        );

        let restricted = analysis.restrict(&window);

        assert_eq!(restricted.series.len(), 4);
        assert_eq!(
            restricted.alerts,
            vec![GroupedAlert {
                alert_index: 2,
                severity: Severity::Medium
            }]
        );
        assert_eq!(restricted.series.samples[2].value, 12.0);
    }

    #[test]
    fn test_counts_by_severity() {
        let analysis = FileAnalysis {
            series: series(&[]),
            alerts: vec![
                GroupedAlert {
                    alert_index: 0,
                    severity: Severity::Low,
                },
                GroupedAlert {
                    alert_index: 3,
                    severity: Severity::Low,
                },
                GroupedAlert {
                    alert_index: 5,
                    severity: Severity::ThreeSigma,
                },
            ],
            event_date: None,
        };

        let counts = analysis.counts();
        assert_eq!(counts.get(&Severity::Low), Some(&2));
        assert_eq!(counts.get(&Severity::ThreeSigma), Some(&1));
        assert_eq!(counts.get(&Severity::High), None);
    }
}
