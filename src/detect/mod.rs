// Per-sample alert detectors
//
// Two independent detectors run over the same series:
// - `OutlierFilter`: band classification with a persistence rule, so that
//   excursions shorter than the outlier tolerance are treated as noise
// - `SigmaDetector`: a k-sigma rule against a per-mode baseline built only from
//   samples the band classifier considers normal
//
// Both emit `RawAlert`s in sample order, tagged with their source, ready for
// the alert grouper.

mod outlier_filter;
mod sigma;

pub use outlier_filter::OutlierFilter;
pub use sigma::{ModeBaseline, SigmaDetector};
