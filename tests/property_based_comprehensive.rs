//! Property-based tests across the analysis pipeline
//!
//! Core properties tested:
//! 1. Outlier tolerance: runs are reported iff they reach tolerance + 1
//! 2. Grouping never produces more events than raw alerts
//! 3. Window restriction keeps only in-window representatives
//! 4. The CSV loader never panics on arbitrary data rows
//! 5. Fingerprints are deterministic

mod utils;

use bandwatch::alert::{AlertSource, Severity};
use bandwatch::detect::OutlierFilter;
use bandwatch::ingest::CsvSeriesLoader;
use bandwatch::pipeline::Pipeline;
use bandwatch::series::{Mode, Sample, TimeSeries, TimeWindow};
use bandwatch::bands::BandClassifier;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use std::path::Path;
use std::time::Duration;

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
        .map(|(i, &v)| Sample::new(start() + TimeDelta::seconds(i as i64), v, Mode::Run))
        .collect();
    TimeSeries::new("Temp", NaiveDate::from_ymd_opt(2024, 3, 1), samples)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_run_reported_iff_it_reaches_tolerance(
        lead in 0usize..10,
        run_len in 1usize..12,
        tail in 0usize..10,
        tolerance in 0usize..10,
        value in prop_oneof![15.5f64..34.5, 10.5f64..14.5, 40.5f64..60.0],
    ) {
        // Normal padding never reads as part of the run
        let mut values = vec![25.0; lead];
        values.extend(std::iter::repeat(value).take(run_len));
        values.extend(std::iter::repeat(25.0).take(tail));

        // Values inside normal are not an excursion at all
        prop_assume!(!(20.0..=30.0).contains(&value));

        let classifier = BandClassifier::new(utils::bands()).unwrap();
        let alerts = OutlierFilter::new(&classifier, tolerance).detect(&series(&values));

        if run_len > tolerance {
            let indices: Vec<usize> = alerts.iter().map(|a| a.sample_index).collect();
            prop_assert_eq!(indices, (lead..lead + run_len).collect::<Vec<_>>());
            prop_assert!(alerts.iter().all(|a| a.source == AlertSource::Band));
        } else {
            prop_assert!(alerts.is_empty());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_grouping_never_adds_events(
        values in prop::collection::vec(0.0f64..60.0, 0..80),
        tolerance in 0usize..4,
        window_secs in 0u64..10,
    ) {
        let mut params = utils::params();
        params.outlier_tolerance = tolerance;
        params.grouping_time_window = Duration::from_secs(window_secs);
        let pipeline = Pipeline::new(&params).unwrap();

        let s = series(&values);
        let raw = pipeline.raw_alerts(&s);
        let raw_band = raw.iter().filter(|a| a.source == AlertSource::Band).count();
        let raw_sigma = raw.len() - raw_band;

        let analysis = pipeline.analyze(s);
        let band = analysis
            .alerts
            .iter()
            .filter(|a| a.severity != Severity::ThreeSigma)
            .count();
        let sigma = analysis.alerts.len() - band;

        prop_assert!(band <= raw_band);
        prop_assert!(sigma <= raw_sigma);
        prop_assert_eq!(band == 0, raw_band == 0);
        prop_assert_eq!(sigma == 0, raw_sigma == 0);
        prop_assert!(analysis.alerts.iter().all(|a| a.alert_index < values.len()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_window_keeps_only_in_window_alerts(
        values in prop::collection::vec(0.0f64..60.0, 1..60),
        from in 0i64..60,
        span in 0i64..60,
    ) {
        let pipeline = Pipeline::new(&utils::params()).unwrap();
        let analysis = pipeline.analyze(series(&values));
        let window = TimeWindow::new(
            start() + TimeDelta::seconds(from),
            start() + TimeDelta::seconds(from + span),
        );

        let restricted = analysis.restrict(&window);

        for alert in &restricted.alerts {
            let sample = restricted.series.get(alert.alert_index);
            prop_assert!(sample.is_some());
            prop_assert!(window.contains(sample.unwrap().timestamp));
        }
        prop_assert!(restricted.alerts.len() <= analysis.alerts.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_csv_loader_never_panics(rows in prop::collection::vec("[0-9:.,a-zA-Z\" -]{0,40}", 0..20)) {
        let mut content = String::from("2024-03-01\n\n\nTime,Temp,Mode\n");
        for row in &rows {
            content.push_str(row);
            content.push('\n');
        }

        let loader = CsvSeriesLoader::default();
        if let Ok(series) = loader.parse(Path::new("HTOL.csv"), &content, "Temp", Mode::Idle) {
            prop_assert!(series.len() <= rows.len());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_fingerprint_deterministic(tolerance in 0usize..100, threshold in 0.1f64..10.0) {
        let mut a = utils::params();
        a.outlier_tolerance = tolerance;
        a.anomaly_threshold = threshold;
        let b = a.clone();

        prop_assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        prop_assert_eq!(a.fingerprint().unwrap().as_str().len(), 16);
    }
}
