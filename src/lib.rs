//! Bandwatch - band and 3-sigma alert analysis for burn-in sensor runs
//!
//! This library classifies per-channel sensor samples against nested,
//! mode-dependent severity bands, runs an independent k-sigma detector,
//! groups nearby alerts into events, and caches per-file results under a
//! fingerprint of the analysis settings.
//!
//! ```
//! use bandwatch::bands::{BandSet, Bands, Bounds};
//! use bandwatch::hyperparams::Hyperparameters;
//! use bandwatch::pipeline::Pipeline;
//! use bandwatch::series::{Mode, Sample, TimeSeries};
//! use chrono::NaiveDate;
//! use std::time::Duration;
//!
//! let set = BandSet {
//!     normal: Bounds::new(20.0, 30.0),
//!     low: Bounds::new(15.0, 35.0),
//!     medium: Bounds::new(10.0, 40.0),
//!     high: Bounds::new(5.0, 45.0),
//! };
//! let params = Hyperparameters {
//!     outlier_tolerance: 0,
//!     grouping_time_window: Duration::from_secs(10),
//!     anomaly_threshold: 3.0,
//!     selected_variable: "Temp".to_string(),
//!     bands: Bands { idle: set, run: set },
//! };
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let samples = [25.0, 25.5, 47.0, 25.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &v)| Sample::new(date.and_hms_opt(8, 0, i as u32).unwrap(), v, Mode::Run))
//!     .collect();
//!
//! let pipeline = Pipeline::new(&params).unwrap();
//! let analysis = pipeline.analyze(TimeSeries::new("Temp", Some(date), samples));
//! assert_eq!(analysis.alerts[0].alert_index, 2);
//! ```

pub mod alert;
pub mod bands;
pub mod cache;
pub mod cli;
pub mod detect;
pub mod error;
pub mod grouping;
pub mod hyperparams;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod run;
pub mod series;
