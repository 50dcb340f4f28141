use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::process::Output;
use tempfile::TempDir;

/// Get a Command for mnemos, isolated from the caller's environment
pub fn mnemos() -> Command {
    let mut cmd = cargo_bin_cmd!("mnemos");
    cmd.env_remove("MNEMOS_HOME")
        .env_remove("MNEMOS_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Setup a test store in a fresh directory
pub fn setup_test_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    mnemos()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

/// First stdout line, trimmed
pub fn first_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Run a record subcommand with `--quiet` and return the new record id
pub fn record(dir: &TempDir, args: &[&str]) -> String {
    let output = mnemos()
        .current_dir(dir.path())
        .arg("--quiet")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    first_line(&output)
}

/// Run a command with `--format json` and parse stdout
pub fn json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = mnemos()
        .current_dir(dir.path())
        .args(["--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}
