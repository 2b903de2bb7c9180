use crate::alert::Severity;
use crate::bands::definition::{BandSet, Bands};
use crate::error::ConfigError;
use crate::series::Mode;

/// Classifies sample values against validated band sets
///
/// Construction validates both band sets once; `classify` is then a pure
/// lookup with no per-sample checks.
///
/// # Example
/// ```
/// use bandwatch::alert::Severity;
/// use bandwatch::bands::{BandClassifier, BandSet, Bands, Bounds};
/// use bandwatch::series::Mode;
///
/// let set = BandSet {
///     normal: Bounds::new(20.0, 30.0),
///     low: Bounds::new(15.0, 35.0),
///     medium: Bounds::new(10.0, 40.0),
///     high: Bounds::new(5.0, 45.0),
/// };
/// let classifier = BandClassifier::new(Bands { idle: set, run: set }).unwrap();
///
/// assert_eq!(classifier.classify(25.0, Mode::Run), None);
/// assert_eq!(classifier.classify(33.0, Mode::Run), Some(Severity::Low));
/// assert_eq!(classifier.classify(99.0, Mode::Idle), Some(Severity::High));
/// ```
#[derive(Debug, Clone)]
pub struct BandClassifier {
    bands: Bands,
}

impl BandClassifier {
    pub fn new(bands: Bands) -> Result<Self, ConfigError> {
        bands.validate()?;
        Ok(Self { bands })
    }

    /// Severity of `value` under the band set of `mode`, or `None` when the
    /// value is inside the normal interval or is a missing reading (NaN).
    pub fn classify(&self, value: f64, mode: Mode) -> Option<Severity> {
        classify_in(self.bands.for_mode(mode), value)
    }
}

fn classify_in(set: &BandSet, value: f64) -> Option<Severity> {
    if value.is_nan() || set.normal.contains(value) {
        None
    } else if set.low.contains(value) {
        Some(Severity::Low)
    } else if set.medium.contains(value) {
        Some(Severity::Medium)
    } else {
        // Beyond medium, including past the outermost high bounds
        Some(Severity::High)
    }
}
