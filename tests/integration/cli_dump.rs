//! The `dump` subcommand, run as a real binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use super::common::fixtures::{sample_fixture, write_fixture};

fn devtools(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("replay-devtools").expect("binary is built");
    cmd.arg("--data-dir").arg(data_dir.path());
    cmd
}

#[test]
fn test_dump_prints_tree_and_timeline() {
    let (_fixture_dir, path) = write_fixture(&sample_fixture());
    let data_dir = TempDir::new().unwrap();

    devtools(&data_dir)
        .arg("dump")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("<html lang=\"en\">"))
        .stdout(predicate::str::contains("    <button id=\"go\">"))
        .stdout(predicate::str::contains("duration: 00:01.000"))
        .stdout(predicate::str::contains("paints: 3"))
        .stdout(predicate::str::contains("screen: h900"));

    // First run writes the example config and a log file
    assert!(data_dir.path().join("config.toml").exists());
    assert!(data_dir.path().join("logs").join("replay-devtools.log").exists());
}

#[test]
fn test_dump_honors_whitespace_setting() {
    let (_fixture_dir, path) = write_fixture(&sample_fixture());
    let data_dir = TempDir::new().unwrap();
    std::fs::write(
        data_dir.path().join("config.toml"),
        "[inspector]\nshow_whitespace_nodes = true\n",
    )
    .unwrap();

    let output = devtools(&data_dir).arg("dump").arg(&path).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let body = stdout.lines().position(|l| l == "  <body class=\"main\">").unwrap();
    // The whitespace text node renders as an empty row under <body>
    assert_eq!(stdout.lines().nth(body + 1), Some("    "));
}

#[test]
fn test_dump_missing_file_fails() {
    let data_dir = TempDir::new().unwrap();

    devtools(&data_dir)
        .arg("dump")
        .arg(data_dir.path().join("nope.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open recording"));
}

#[test]
fn test_dump_rejects_bad_fixture() {
    let data_dir = TempDir::new().unwrap();
    let path = data_dir.path().join("bad.jsonl");
    std::fs::write(&path, "{\"type\":\"node\"}\n").unwrap();

    devtools(&data_dir).arg("dump").arg(&path).assert().failure();
}
