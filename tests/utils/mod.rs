// Shared fixtures for run-level integration tests
//
// Builds a small burn-in run directory on disk: a band definition file and
// a few sensor logs sampled at one-second spacing from 08:00:00.

#![allow(dead_code)]

use bandwatch::bands::{BandSet, Bands, Bounds};
use bandwatch::hyperparams::Hyperparameters;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const BANDS_TOML: &str = r#"
[idle]
normal = { lower = 20.0, upper = 30.0 }
low    = { lower = 15.0, upper = 35.0 }
medium = { lower = 10.0, upper = 40.0 }
high   = { lower = 5.0,  upper = 45.0 }

[run]
normal = { lower = 20.0, upper = 30.0 }
low    = { lower = 15.0, upper = 35.0 }
medium = { lower = 10.0, upper = 40.0 }
high   = { lower = 5.0,  upper = 45.0 }
"#;

/// One low excursion of three samples (indices 3..=5) in a normal baseline
pub const EXCURSION: [f64; 10] = [24.0, 26.0, 24.0, 33.0, 33.0, 33.0, 26.0, 24.0, 26.0, 24.0];

/// Never leaves the normal band
pub const QUIET: [f64; 6] = [24.0, 26.0, 24.0, 26.0, 24.0, 26.0];

pub fn bands() -> Bands {
    let set = BandSet {
        normal: Bounds::new(20.0, 30.0),
        low: Bounds::new(15.0, 35.0),
        medium: Bounds::new(10.0, 40.0),
        high: Bounds::new(5.0, 45.0),
    };
    Bands { idle: set, run: set }
}

pub fn params() -> Hyperparameters {
    Hyperparameters {
        outlier_tolerance: 2,
        grouping_time_window: Duration::from_secs(1),
        anomaly_threshold: 3.0,
        selected_variable: "Temp".to_string(),
        bands: bands(),
    }
}

pub fn hour_ago() -> SystemTime {
    SystemTime::now() - Duration::from_secs(3600)
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Write a sensor log whose `Temp` column holds `values`.
///
/// The file's modification time is pushed an hour into the past so that
/// cache entries written by the test are unambiguously newer.
pub fn write_log(dir: &Path, name: &str, values: &[f64]) -> PathBuf {
    let mut content = String::from("Burn-in HTOL lot 42, started 2024-03-01\nrig: 3\nslot: A\nTime,Temp,Voltage\n");
    for (i, value) in values.iter().enumerate() {
        content.push_str(&format!("08:00:{:02},{},3.30\n", i, value));
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    set_mtime(&path, hour_ago());
    path
}

/// Log without the `Temp` column
pub fn write_log_without_temp(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        "Burn-in HTOL lot 42, started 2024-03-01\n\n\nTime,Voltage\n08:00:00,3.30\n",
    )
    .unwrap();
    set_mtime(&path, hour_ago());
    path
}

/// Standard run: one excursion file, one file missing the channel, one
/// quiet file, and a non-eligible notes file
pub fn standard_run(root: &Path) -> PathBuf {
    let run = root.join("lot42");
    fs::create_dir_all(&run).unwrap();
    write_log(&run, "HTOL_01.csv", &EXCURSION);
    write_log_without_temp(&run, "HTOL_02.csv");
    write_log(&run, "HTOL_03.csv", &QUIET);
    fs::write(run.join("notes.txt"), "operator notes").unwrap();
    run
}
