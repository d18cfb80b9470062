//! Exercises the `compare_demo` binary as a subprocess.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

type STDRESULT = Result<(), Box<dyn std::error::Error>>;

#[test]
fn default_run_reports_dot_counts() -> STDRESULT {
    let mut cmd = Command::cargo_bin("compare_demo")?;
    cmd.env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains("dots"));
    Ok(())
}

#[test]
fn rejects_invalid_window_mismatch_combination() -> STDRESULT {
    let mut cmd = Command::cargo_bin("compare_demo")?;
    cmd.arg("--ktup").arg("8").arg("--window").arg("4").assert().failure();
    Ok(())
}

#[test]
fn custom_parameters_change_reported_dot_count() -> STDRESULT {
    let loose = Command::cargo_bin("compare_demo")?
        .env("RUST_LOG", "info")
        .arg("--ktup")
        .arg("2")
        .arg("--window")
        .arg("4")
        .arg("--mismatch")
        .arg("1")
        .output()?;
    assert!(loose.status.success());
    Ok(())
}
