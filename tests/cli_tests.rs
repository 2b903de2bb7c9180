//! Integration tests for the bandwatch command line

mod utils;

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use utils::*;

fn bandwatch(tmp: &Path, run: &Path) -> assert_cmd::Command {
    let bands = tmp.join("bands.toml");
    fs::write(&bands, BANDS_TOML).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("bandwatch");
    cmd.arg(run)
        .arg("--bands")
        .arg(&bands)
        .arg("--variable")
        .arg("Temp")
        .arg("--grouping-window")
        .arg("1")
        .arg("--cache-dir")
        .arg(tmp.join("cache"));
    cmd
}

#[test]
fn test_text_report() {
    let tmp = TempDir::new().unwrap();
    let run = standard_run(tmp.path());

    bandwatch(tmp.path(), &run)
        .assert()
        .success()
        .stdout(predicate::str::contains("HTOL_01.csv [Temp, 10 samples, 2024-03-01]"))
        .stdout(predicate::str::contains("total              2"))
        .stdout(predicate::str::contains("HTOL_02.csv").not());
}

#[test]
fn test_json_report_parses() {
    let tmp = TempDir::new().unwrap();
    let run = standard_run(tmp.path());

    let output = bandwatch(tmp.path(), &run)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["alert_counts"]["low"], 1);
    assert_eq!(parsed["alert_counts"]["3-sigma"], 1);
    assert_eq!(parsed["files"]["HTOL_01.csv"]["samples"], 10);
    assert!(parsed["files"]["HTOL_03.csv"]["alerts"].as_array().unwrap().is_empty());
}

#[test]
fn test_progress_on_stderr() {
    let tmp = TempDir::new().unwrap();
    let run = standard_run(tmp.path());

    bandwatch(tmp.path(), &run)
        .assert()
        .success()
        .stderr(predicate::str::contains("[ 33%] Processing HTOL_01.csv"))
        .stderr(predicate::str::contains("[100%] Processing HTOL_03.csv"));
}

#[test]
fn test_no_progress_flag() {
    let tmp = TempDir::new().unwrap();
    let run = standard_run(tmp.path());

    bandwatch(tmp.path(), &run)
        .arg("--no-progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing").not());
}

#[test]
fn test_window_flags() {
    let tmp = TempDir::new().unwrap();
    let run = standard_run(tmp.path());

    bandwatch(tmp.path(), &run)
        .arg("--start")
        .arg("2024-03-01 08:00:04")
        .arg("--end")
        .arg("2024-03-01 08:00:09")
        .assert()
        .success()
        .stdout(predicate::str::contains("total              0"));
}

#[test]
fn test_invalid_threshold_fails() {
    let tmp = TempDir::new().unwrap();
    let run = standard_run(tmp.path());

    bandwatch(tmp.path(), &run)
        .arg("--anomaly-threshold")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("anomaly_threshold"));
}

#[test]
fn test_bad_bands_file_fails() {
    let tmp = TempDir::new().unwrap();
    let run = standard_run(tmp.path());
    let bands = tmp.path().join("broken.toml");
    fs::write(&bands, "[idle]\nnormal = { lower = 20.0, upper = 30.0 }\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("bandwatch");
    cmd.arg(&run)
        .arg("--bands")
        .arg(&bands)
        .arg("--variable")
        .arg("Temp")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load band definitions"));
}

#[test]
fn test_missing_run_dir_fails() {
    let tmp = TempDir::new().unwrap();

    bandwatch(tmp.path(), &tmp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to analyze run"));
}
