//! E2E tests for the `conveyor` binary

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn scaffold(root: &Path) {
    fs::create_dir_all(root.join("src/js")).unwrap();
    fs::write(root.join("src/js/index.js"), "console.log('cli');\n").unwrap();
    fs::create_dir_all(root.join("src/styles")).unwrap();
    fs::write(root.join("src/styles/common.scss"), "body { margin: 0 }\n").unwrap();
    fs::create_dir_all(root.join("src/assets")).unwrap();
    fs::write(root.join("src/assets/robots.txt"), "User-agent: *\n").unwrap();
}

#[test]
fn build_production_succeeds_with_ndjson_events() {
    let dir = tempdir().unwrap();
    scaffold(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_conveyor"))
        .arg("--json")
        .arg("build")
        .arg("--root")
        .arg(dir.path())
        .arg("--production")
        .output()
        .expect("failed to run conveyor build");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains(r#""event":"build_started""#));
    assert!(stdout.contains(r#""event":"stage_complete""#));
    assert!(stdout.contains(r#""event":"build_complete""#));

    assert!(dir.path().join("manifest/js.json").exists());
    assert!(dir.path().join("public/robots.txt").exists());
}

#[test]
fn build_failure_exits_nonzero_and_reports_the_stage() {
    let dir = tempdir().unwrap();
    scaffold(dir.path());
    fs::write(
        dir.path().join("conveyor.toml"),
        "[tools]\nscripts = \"definitely-not-a-real-binary-5c2e\"\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_conveyor"))
        .arg("--json")
        .arg("build")
        .arg("--root")
        .arg(dir.path())
        .arg("--production")
        .output()
        .expect("failed to run conveyor build");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(r#""event":"stage_failed""#),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("scripts"), "stdout: {stdout}");
}

#[test]
fn environment_variable_selects_production() {
    let dir = tempdir().unwrap();
    scaffold(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_conveyor"))
        .arg("--json")
        .arg("build")
        .arg("--root")
        .arg(dir.path())
        .env("CONVEYOR_ENV", "production")
        .output()
        .expect("failed to run conveyor build");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""mode":"production""#), "stdout: {stdout}");
    assert!(dir.path().join("manifest").exists());
}

#[test]
fn development_is_the_default_mode() {
    let dir = tempdir().unwrap();
    scaffold(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_conveyor"))
        .arg("--json")
        .arg("build")
        .arg("--root")
        .arg(dir.path())
        .env_remove("CONVEYOR_ENV")
        .output()
        .expect("failed to run conveyor build");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""mode":"development""#), "stdout: {stdout}");
    assert!(!dir.path().join("manifest").exists());
}

#[test]
fn graph_prints_the_execution_order() {
    let output = Command::new(env!("CARGO_BIN_EXE_conveyor"))
        .arg("graph")
        .output()
        .expect("failed to run conveyor graph");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"clean"));
    assert!(stdout.contains("styles <- sprite, copy-svgs, copy-images"));
    assert!(stdout.contains("copy-assets <- scripts, styles, copy-svgs"));
}

#[test]
fn clean_removes_build_output() {
    let dir = tempdir().unwrap();
    scaffold(dir.path());

    let status = Command::new(env!("CARGO_BIN_EXE_conveyor"))
        .arg("build")
        .arg("--root")
        .arg(dir.path())
        .arg("--production")
        .status()
        .expect("failed to run conveyor build");
    assert!(status.success());
    assert!(dir.path().join("public").exists());

    let status = Command::new(env!("CARGO_BIN_EXE_conveyor"))
        .arg("clean")
        .arg("--root")
        .arg(dir.path())
        .arg("--yes")
        .status()
        .expect("failed to run conveyor clean");
    assert!(status.success());

    assert!(!dir.path().join("public").exists());
    assert!(!dir.path().join("manifest").exists());
}
