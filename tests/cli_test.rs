//! Command-line behaviour of the `imbalance` binary
//!
//! - Invalid ratio or output directory exits with status -1 before any work
//! - Unknown technique names are rejected while parsing arguments
//! - A small sweep writes its tables and manifest

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Status of `exit(-1)` as reported by the OS.
#[cfg(unix)]
const EXIT_INVALID: i32 = 255;
#[cfg(not(unix))]
const EXIT_INVALID: i32 = -1;

/// Clap's usage-error status.
const EXIT_USAGE: i32 = 2;

fn imbalance(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_imbalance"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch imbalance")
}

/// Options file selecting two features, and a separable 40:20 dataset.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("options.toml"),
        "[image-processing]\nfactors = \"hue, area\"\n\n[dataset]\nlabel = \"type\"\n",
    )
    .unwrap();

    let mut csv = String::from("hue,area,type\n");
    for i in 0..40 {
        csv.push_str(&format!("{},{},0\n", f64::from(i) * 0.01, 1.0 + f64::from(i % 7) * 0.1));
    }
    for i in 0..20 {
        csv.push_str(&format!("{},{},1\n", 5.0 + f64::from(i) * 0.01, 3.0 + f64::from(i % 5) * 0.1));
    }
    fs::write(dir.path().join("weeds.csv"), csv).unwrap();
    dir
}

fn args(dir: &Path, extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        dir.join("weeds.csv").display().to_string(),
        "-i".to_string(),
        dir.join("options.toml").display().to_string(),
        "-d".to_string(),
        dir.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| (*s).to_string()));
    args
}

fn run_in(dir: &Path, extra: &[&str]) -> Output {
    let args = args(dir, extra);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    imbalance(&refs)
}

fn assert_nothing_written(dir: &Path) {
    assert!(!dir.join("imbalance.csv").exists());
    assert!(!dir.join("uncorrected-imbalance.csv").exists());
    assert!(!dir.join("manifest.json").exists());
}

// ============================================================================
// Invalid ratio
// ============================================================================

#[test]
fn test_ratio_without_colon_exits_invalid() {
    let dir = workspace();
    let output = run_in(dir.path(), &["-r", "10"]);
    assert_eq!(output.status.code(), Some(EXIT_INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid ratio specified: 10"));
    assert_nothing_written(dir.path());
}

#[test]
fn test_ratio_with_two_ranges_exits_invalid() {
    let dir = workspace();
    let output = run_in(dir.path(), &["-r", "10:1:2"]);
    assert_eq!(output.status.code(), Some(EXIT_INVALID));
    assert_nothing_written(dir.path());
}

// ============================================================================
// Invalid directory
// ============================================================================

#[test]
fn test_missing_directory_exits_invalid() {
    let dir = workspace();
    let missing = dir.path().join("nowhere");
    let missing = missing.display().to_string();
    let output = run_in(dir.path(), &["-d", &missing]);
    assert_eq!(output.status.code(), Some(EXIT_INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unable to access directory"));
    assert_nothing_written(dir.path());
}

// ============================================================================
// Unknown technique names
// ============================================================================

#[test]
fn test_unknown_classifier_rejected_while_parsing() {
    let dir = workspace();
    let output = run_in(dir.path(), &["-c", "bayes"]);
    assert_eq!(output.status.code(), Some(EXIT_USAGE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("bayes"));
    assert_nothing_written(dir.path());
}

#[test]
fn test_unknown_name_wins_over_bad_directory() {
    let output = imbalance(&["-f", "weeds.csv", "-c", "bayes", "-d", "/nonexistent/imbalance"]);
    assert_eq!(output.status.code(), Some(EXIT_USAGE));
}

#[test]
fn test_unknown_correction_and_subset_rejected() {
    let dir = workspace();
    for extra in [["-a", "cluster"], ["-s", "validation"]] {
        let output = run_in(dir.path(), &extra);
        assert_eq!(output.status.code(), Some(EXIT_USAGE), "{extra:?}");
        assert!(String::from_utf8_lossy(&output.stderr).contains(extra[1]));
    }
    assert_nothing_written(dir.path());
}

// ============================================================================
// Successful sweep
// ============================================================================

#[test]
fn test_small_sweep_writes_outputs() {
    let dir = workspace();
    let output = run_in(
        dir.path(),
        &["-c", "RandomForest", "-a", "random", "-r", "2:1", "--log-level", "warn"],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let corrected = fs::read_to_string(dir.path().join("imbalance.csv")).unwrap();
    let mut lines = corrected.lines();
    assert!(lines.next().unwrap().starts_with(",classification,"));
    let fields: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(&fields[1..4], &["RANDOMFOREST", "2.0:1.0", "RANDOM"]);
    assert!(lines.next().is_none());

    assert!(dir.path().join("uncorrected-imbalance.csv").exists());
    let manifest = fs::read_to_string(dir.path().join("manifest.json")).unwrap();
    assert!(manifest.contains("Success"), "{manifest}");
}
