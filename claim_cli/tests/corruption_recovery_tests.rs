//! Corruption recovery tests for vclaim.
//!
//! These tests verify the CLI keeps working with:
//! - Corrupted profile files
//! - Unparseable JSONL lines
//! - Partial trailing writes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("config.toml"), "").expect("Failed to write config");
    dir
}

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vclaim"));
    cmd.arg("--data-dir")
        .arg(dir)
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

#[test]
fn test_corrupted_profiles_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("condition_profiles.json"), "{ invalid json }}}}").unwrap();

    cli(data_dir)
        .args(["analyze", "--as-of", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conditions have data"));

    // Editing replaces the unreadable file with a valid one
    cli(data_dir)
        .args(["profile", "set", "6847", "--diagnosed", "true"])
        .assert()
        .success();
    let contents = fs::read_to_string(data_dir.join("condition_profiles.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["6847"]["hasDiagnosis"], true);
}

#[test]
fn test_corrupted_log_lines_are_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let mut file = fs::File::create(data_dir.join("symptom_logs.jsonl")).unwrap();
    writeln!(file, "{{ invalid json }}").unwrap();
    writeln!(
        file,
        r#"{{"id":"a","symptomId":"tinnitus","timestamp":"2024-05-30T09:00:00Z"}}"#
    )
    .unwrap();
    writeln!(file, "not even close").unwrap();
    drop(file);

    cli(data_dir)
        .args(["analyze", "--code", "6260", "--as-of", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DC 6260"));
}

#[test]
fn test_partial_trailing_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let mut file = fs::File::create(data_dir.join("measurements.jsonl")).unwrap();
    writeln!(
        file,
        r#"{{"id":"bp1","measurementType":"blood-pressure","timestamp":"2024-05-30T09:00:00Z","values":{{"systolic":165.0,"diastolic":101.0}}}}"#
    )
    .unwrap();
    // Simulate a crash in the middle of an append
    write!(file, r#"{{"id":"bp2","measurementType":"blood-"#).unwrap();
    drop(file);

    cli(data_dir)
        .args(["analyze", "--code", "7101", "--as-of", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DC 7101"));

    // Appends still succeed after the torn write
    cli(data_dir)
        .args(["measure", "blood-pressure", "--value", "systolic=150", "--value", "diastolic=90"])
        .assert()
        .success();
}

#[test]
fn test_missing_data_directory() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("does").join("not").join("exist");
    let config = temp_dir.path().join("config.toml");

    Command::new(assert_cmd::cargo::cargo_bin!("vclaim"))
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--config")
        .arg(&config)
        .args(["summary", "--as-of", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No conditions have data"));

    Command::new(assert_cmd::cargo::cargo_bin!("vclaim"))
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--config")
        .arg(&config)
        .args(["log", "back-pain", "--severity", "4"])
        .assert()
        .success();
    assert!(data_dir.join("symptom_logs.jsonl").exists());
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[evaluation]\ndefault_days = 45\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("conditions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("default_days"));
}
