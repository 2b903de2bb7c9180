use crate::alert::{RawAlert, Severity};
use crate::bands::BandClassifier;
use crate::series::TimeSeries;

/// Band classification with a persistence requirement
///
/// A non-normal sample is reported only when it belongs to a run of at least
/// `outlier_tolerance + 1` consecutive non-normal samples. Every sample of a
/// reported run keeps its own severity; a run may mix tiers and modes.
#[derive(Debug, Clone)]
pub struct OutlierFilter<'a> {
    classifier: &'a BandClassifier,
    outlier_tolerance: usize,
}

impl<'a> OutlierFilter<'a> {
    pub fn new(classifier: &'a BandClassifier, outlier_tolerance: usize) -> Self {
        Self {
            classifier,
            outlier_tolerance,
        }
    }

    fn min_run_len(&self) -> usize {
        self.outlier_tolerance.saturating_add(1)
    }

    /// Detect sustained band excursions, in sample order
    pub fn detect(&self, series: &TimeSeries) -> Vec<RawAlert> {
        let mut alerts = Vec::new();
        let mut run: Vec<(usize, Severity)> = Vec::new();

        for (index, sample) in series.samples.iter().enumerate() {
            match self.classifier.classify(sample.value, sample.mode) {
                Some(severity) => run.push((index, severity)),
                None => self.flush(&mut run, &mut alerts),
            }
        }
        // A run cut short by the end of the series still counts
        self.flush(&mut run, &mut alerts);

        tracing::debug!(
            channel = %series.channel,
            samples = series.len(),
            alerts = alerts.len(),
            tolerance = self.outlier_tolerance,
            "band detection complete"
        );
        alerts
    }

    fn flush(&self, run: &mut Vec<(usize, Severity)>, alerts: &mut Vec<RawAlert>) {
        if run.len() >= self.min_run_len() {
            alerts.extend(
                run.iter()
                    .map(|&(index, severity)| RawAlert::band(index, severity)),
            );
        }
        run.clear();
    }
}
