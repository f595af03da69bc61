//! CLI argument parsing and end-to-end command tests.
//!
//! Every command runs against a fresh temporary project directory with a
//! fixed environment prefix unset, so the developer's own configuration
//! does not leak into results.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn elevator(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("elevator").unwrap();
    cmd.current_dir(project.path())
        .env_remove("RUST_LOG")
        .env("HOME", project.path())
        .env("XDG_CONFIG_HOME", project.path().join(".config"))
        .arg("--no-color");
    cmd
}

// ============================================================================
// Informational Commands
// ============================================================================

#[test]
fn version_command_succeeds() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("elevator"));
}

#[test]
fn version_flag_shows_version() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("elevator"));
}

#[test]
fn help_flag_shows_usage() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("sim"));
}

// ============================================================================
// Simulation
// ============================================================================

#[test]
fn sim_prints_text_report() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .args(["sim", "-n", "500", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("look/wrap"))
        .stdout(predicate::str::contains("Total seek"))
        .stdout(predicate::str::contains("serviced exactly once"));
}

#[test]
fn sim_json_is_machine_readable() {
    let temp = TempDir::new().unwrap();
    let output = elevator(&temp)
        .args([
            "sim",
            "--policy",
            "sstf",
            "--pattern",
            "hotspot",
            "-n",
            "300",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["policy"], "sstf");
    assert_eq!(report["pattern"], "hotspot");
    assert_eq!(report["requests"], 300);
}

#[test]
fn sim_is_deterministic_per_seed() {
    let temp = TempDir::new().unwrap();
    let run = || {
        elevator(&temp)
            .args(["sim", "-n", "400", "--seed", "99", "--format", "json"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn sim_rejects_unknown_policy() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .args(["sim", "--policy", "fifo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown seek policy"));
}

#[test]
fn sim_rejects_invalid_workload() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .args(["sim", "--max-length", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zero-length"));
}

#[test]
fn compare_lists_every_variant() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .args(["compare", "-n", "400", "--seed", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("look/wrap"))
        .stdout(predicate::str::contains("look/reverse"))
        .stdout(predicate::str::contains("look/stall"))
        .stdout(predicate::str::contains("sstf"));
}

#[test]
fn compare_json_has_one_report_per_variant() {
    let temp = TempDir::new().unwrap();
    let output = elevator(&temp)
        .args(["compare", "-n", "200", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports.len(), 4);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_shows_defaults() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Policy: look"))
        .stdout(predicate::str::contains("Sweep end: wrap"));
}

#[test]
fn project_file_changes_the_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("elevator.toml"),
        "[scheduler]\npolicy = \"sstf\"\n\n[simulation]\nrequests = 123\n",
    )
    .unwrap();

    elevator(&temp)
        .args(["config", "--format", "toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("policy = \"sstf\""))
        .stdout(predicate::str::contains("requests = 123"));
}

#[test]
fn environment_overrides_project_file() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("elevator.toml"),
        "[scheduler]\nsweep_end = \"reverse\"\n",
    )
    .unwrap();

    elevator(&temp)
        .env("ELEVATOR_SCHEDULER__SWEEP_END", "stall")
        .args(["config", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sweep_end\": \"stall\""));
}

#[test]
fn explicit_config_file_is_used() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("run.toml");
    std::fs::write(&path, "[simulation]\npattern = \"sequential\"\n").unwrap();

    elevator(&temp)
        .args(["config", "--config", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pattern: sequential"));
}

#[test]
fn missing_config_file_fails() {
    let temp = TempDir::new().unwrap();
    elevator(&temp)
        .args(["config", "--config", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}
