//! Integration tests for the CLI interface

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Command running inside `dir` with no inherited configuration
fn fluent_gwl(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fluent-gwl").unwrap();
    cmd.current_dir(dir)
        .env_remove("FLUENT_GWL_CATALOG")
        .env_remove("FLUENT_GWL_LIQUID_CLASS")
        .env_remove("FLUENT_GWL_LOG_LEVEL")
        .env_remove("FLUENT_GWL_STRICT_LIQUID_CLASS");
    cmd
}

#[test]
fn test_cli_help_flag() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("labware"));
}

#[test]
fn test_invalid_command() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_plan_writes_worklist_and_labware() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .args(["plan", fixture("pcr_setup.yaml").to_str().unwrap()])
        .args(["--prefix", "run1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run1.gwl"));

    let worklist = std::fs::read_to_string(temp_dir.path().join("run1.gwl")).unwrap();
    let lines: Vec<&str> = worklist.lines().collect();
    assert_eq!(lines[0], "C;Mastermix");
    assert!(lines[1].starts_with("R;Mastermix[001];;25ml_1 waste;1;1;PCR;;96 Well Skirted PCR;1;96;13.1;MasterMix Free Multi;2;6;0;"));
    assert_eq!(lines[2], "B;");
    assert!(worklist.ends_with("B;\n"));
    // the zero-volume sample row produces no commands
    assert_eq!(lines.iter().filter(|l| l.starts_with("A;")).count(), 2);

    let labware = std::fs::read_to_string(temp_dir.path().join("run1_labware.txt")).unwrap();
    assert!(labware.starts_with("labware_name\tlabware_type\ttarget_location\ttarget_position\n"));
    assert!(labware.contains("Mastermix[001]\t25ml_1 waste\tTrough 25ml 8Pos\t"));
    assert!(labware.contains("PCR\t96 Well Skirted PCR\tMP 3Pos Fluent\t"));
}

#[test]
fn test_failed_plan_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .args(["plan", fixture("unknown_labware.yaml").to_str().unwrap()])
        .args(["--prefix", "broken"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not A Plate"));

    assert!(!temp_dir.path().join("broken.gwl").exists());
    assert!(!temp_dir.path().join("broken_labware.txt").exists());
}

#[test]
fn test_check_accepts_generated_worklist() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .args(["plan", fixture("pcr_setup.yaml").to_str().unwrap()])
        .args(["--prefix", "run1"])
        .assert()
        .success();

    fluent_gwl(temp_dir.path())
        .args(["check", "run1.gwl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_check_rejects_bad_line() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("bad.gwl"), "C;start\n\nW;\n").unwrap();

    fluent_gwl(temp_dir.path())
        .args(["check", "bad.gwl"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_labware_from_worklist_without_tip_types() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("hand.gwl"),
        "A;Samples;;96 Well Skirted PCR;1;;20.0;Water Free Single;;;\n\
         D;Plate;;96 Well Skirted PCR;1;;20.0;Water Free Single;;;\n\
         W;\n",
    )
    .unwrap();

    fluent_gwl(temp_dir.path())
        .args(["labware", "hand.gwl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FCA, 50ul SBS[001]\tFCA, 50ul SBS"))
        .stdout(predicate::str::contains("Samples\t96 Well Skirted PCR\tMP 3Pos Fluent"))
        .stdout(predicate::str::contains("Plate\t96 Well Skirted PCR\tMP 3Pos Fluent"));
}

#[test]
fn test_labware_output_file() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .args(["plan", fixture("pcr_setup.yaml").to_str().unwrap()])
        .args(["--prefix", "run1"])
        .assert()
        .success();

    fluent_gwl(temp_dir.path())
        .args(["labware", "run1.gwl", "--output", "again.txt"])
        .assert()
        .success();

    let first = std::fs::read_to_string(temp_dir.path().join("run1_labware.txt")).unwrap();
    let again = std::fs::read_to_string(temp_dir.path().join("again.txt")).unwrap();
    assert_eq!(first, again);
}

#[test]
fn test_catalog_listing() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .args(["catalog", "tips"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FCA, 200ul SBS"))
        .stdout(predicate::str::contains("Liquid classes").not());
}

#[test]
fn test_tip_selection() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .args(["tip", "5"])
        .assert()
        .success()
        .stdout("FCA, 10ul SBS\n");

    // the DTH limit is exclusive
    fluent_gwl(temp_dir.path())
        .args(["tip", "9"])
        .assert()
        .success()
        .stdout("FCA, 50ul SBS\n");

    fluent_gwl(temp_dir.path())
        .args(["tip", "5", "--container", "10ml Falcon"])
        .assert()
        .success()
        .stdout("FCA, 200ul SBS\n");

    fluent_gwl(temp_dir.path())
        .args(["tip", "2000"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No tip type can hold"));
}

#[test]
fn test_config_file_limits_tip_types() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("fluent-gwl.toml"),
        "tip_types = [\"FCA, 200ul SBS\", \"FCA, 1000ul SBS\"]\n",
    )
    .unwrap();

    fluent_gwl(temp_dir.path())
        .args(["tip", "5"])
        .assert()
        .success()
        .stdout("FCA, 200ul SBS\n");
}

#[test]
fn test_invalid_log_level_from_env() {
    let temp_dir = TempDir::new().unwrap();
    fluent_gwl(temp_dir.path())
        .env("FLUENT_GWL_LOG_LEVEL", "chatty")
        .args(["catalog"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid log level"));
}

#[test]
fn test_config_loading_is_logged_with_verbose() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("fluent-gwl.toml"),
        "default_liquid_class = \"Water Free Single\"\n",
    )
    .unwrap();

    fluent_gwl(temp_dir.path())
        .env("NO_COLOR", "1")
        .args(["-v", "tip", "5"])
        .assert()
        .success()
        .stdout("FCA, 10ul SBS\n")
        .stderr(predicate::str::contains("Loading configuration from"));
}

#[test]
fn test_configured_log_level_applies_without_verbose() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("fluent-gwl.toml"), "log_level = \"debug\"\n").unwrap();

    fluent_gwl(temp_dir.path())
        .env("NO_COLOR", "1")
        .args(["catalog", "tips"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Catalog ready"));
}
