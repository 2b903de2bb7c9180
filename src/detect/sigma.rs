use crate::alert::RawAlert;
use crate::bands::BandClassifier;
use crate::series::{Mode, TimeSeries};
use trueno::Vector;

/// Normal-only baseline statistics for one operating mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeBaseline {
    pub mode: Mode,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub stddev: f64,
    pub count: usize,
}

impl ModeBaseline {
    /// Build from baseline values; `None` below two samples
    ///
    /// Statistics run on residuals against the first value, so a constant
    /// baseline has exactly its own value as mean and a zero deviation.
    fn from_values(mode: Mode, values: &[f64]) -> Option<Self> {
        let (&pivot, _) = values.split_first()?;
        if values.len() < 2 {
            return None;
        }

        let residuals: Vec<f32> = values.iter().map(|v| (v - pivot) as f32).collect();
        let v = Vector::from_slice(&residuals);
        let offset = v.mean().ok()?;
        // Population variance, rescaled to the sample (n - 1) estimator
        let n = values.len() as f64;
        let variance = f64::from(v.variance().ok()?) * n / (n - 1.0);

        Some(Self {
            mode,
            mean: pivot + f64::from(offset),
            stddev: variance.max(0.0).sqrt(),
            count: values.len(),
        })
    }

    /// Exclusive k-sigma test
    pub fn is_outlier(&self, value: f64, threshold: f64) -> bool {
        (value - self.mean).abs() > threshold * self.stddev
    }
}

/// k-sigma detector against a per-mode, normal-only baseline
///
/// Samples the band classifier already flags are excluded from the baseline
/// so that anomalies cannot widen their own acceptance range. A mode with
/// fewer than two normal samples is skipped for that series.
#[derive(Debug, Clone)]
pub struct SigmaDetector<'a> {
    classifier: &'a BandClassifier,
    anomaly_threshold: f64,
}

impl<'a> SigmaDetector<'a> {
    pub fn new(classifier: &'a BandClassifier, anomaly_threshold: f64) -> Self {
        Self {
            classifier,
            anomaly_threshold,
        }
    }

    /// Compute the baseline of every mode present in the series
    pub fn baselines(&self, series: &TimeSeries) -> Vec<ModeBaseline> {
        Mode::ALL
            .iter()
            .filter_map(|&mode| {
                let values: Vec<f64> = series
                    .samples
                    .iter()
                    .filter(|s| s.mode == mode && !s.is_missing())
                    .filter(|s| self.classifier.classify(s.value, mode).is_none())
                    .map(|s| s.value)
                    .collect();

                let baseline = ModeBaseline::from_values(mode, &values);
                if baseline.is_none() && series.samples.iter().any(|s| s.mode == mode) {
                    tracing::debug!(
                        channel = %series.channel,
                        %mode,
                        normal_samples = values.len(),
                        "insufficient baseline, skipping 3-sigma detection for mode"
                    );
                }
                baseline
            })
            .collect()
    }

    /// Detect k-sigma outliers, in sample order
    pub fn detect(&self, series: &TimeSeries) -> Vec<RawAlert> {
        let baselines = self.baselines(series);

        let alerts: Vec<RawAlert> = series
            .samples
            .iter()
            .enumerate()
            .filter(|(_, sample)| !sample.is_missing())
            .filter_map(|(index, sample)| {
                let baseline = baselines.iter().find(|b| b.mode == sample.mode)?;
                baseline
                    .is_outlier(sample.value, self.anomaly_threshold)
                    .then(|| RawAlert::three_sigma(index))
            })
            .collect();

        tracing::debug!(
            channel = %series.channel,
            baselines = baselines.len(),
            alerts = alerts.len(),
            threshold = self.anomaly_threshold,
            "3-sigma detection complete"
        );
        alerts
    }
}
