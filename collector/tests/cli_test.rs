//! Tests for the `collector` binary.
use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const LOOP: &str = "<?php
foreach ($items as $key => $item) { echo $item . $key . $extra; }
";

fn project() -> Result<TempDir> {
    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("app"))?;
    fs::write(temp.path().join("app/index.php"), LOOP)?;
    fs::create_dir_all(temp.path().join("vendor/acme"))?;
    fs::write(temp.path().join("vendor/acme/lib.php"), LOOP)?;
    Ok(temp)
}

#[test]
fn test_cli_reports_loop() -> Result<()> {
    let temp = project()?;

    Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .arg("app")
        .assert()
        .success()
        .stdout(predicate::str::contains("app/index.php:2:1"))
        .stdout(predicate::str::contains("Refactor foreach to collection"));

    Ok(())
}

#[test]
fn test_cli_json_skips_vendor() -> Result<()> {
    let temp = project()?;

    let output = Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .arg("--json")
        .output()?;
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(parsed["summary"]["total_files"], 1);
    assert_eq!(parsed["summary"]["fixable_loops"], 1);

    Ok(())
}

#[test]
fn test_cli_fix_preview_does_not_write() -> Result<()> {
    let temp = project()?;

    Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .args(["app", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN]"))
        .stdout(predicate::str::contains(
            "collect($items)->each(function($item, $key) use ($extra) {echo $item . $key . $extra;});",
        ));

    assert_eq!(fs::read_to_string(temp.path().join("app/index.php"))?, LOOP);
    Ok(())
}

#[test]
fn test_cli_fix_apply_writes_file() -> Result<()> {
    let temp = project()?;

    Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .args(["app", "--fix", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed:"));

    assert_eq!(
        fs::read_to_string(temp.path().join("app/index.php"))?,
        "<?php\ncollect($items)->each(function($item, $key) use ($extra) {echo $item . $key . $extra;});\n"
    );
    Ok(())
}

#[test]
fn test_cli_fix_refuses_files_outside_root() -> Result<()> {
    let temp = project()?;
    let outside = TempDir::new()?;
    let stray = outside.path().join("stray.php");
    fs::write(&stray, LOOP)?;

    Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .arg(&stray)
        .args(["--fix", "--apply"])
        .assert()
        .failure();

    assert_eq!(fs::read_to_string(&stray)?, LOOP);
    Ok(())
}

#[test]
fn test_cli_fail_on_problems() -> Result<()> {
    let temp = project()?;

    Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .args(["--quiet", "--fail-on-problems"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[GATE] Refactorable loops: 1 - FAILED"));

    Ok(())
}

#[test]
fn test_cli_missing_path() -> Result<()> {
    Command::cargo_bin("collector")?
        .arg("no/such/dir")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn test_cli_apply_without_fix_is_rejected() -> Result<()> {
    Command::cargo_bin("collector")?
        .arg("--apply")
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn test_cli_files_subcommand() -> Result<()> {
    let temp = project()?;

    Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .args(["files", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("index.php"))
        .stdout(predicate::str::contains("lib.php").not());

    Ok(())
}

#[test]
fn test_cli_init_creates_config() -> Result<()> {
    let temp = TempDir::new()?;

    Command::cargo_bin("collector")?
        .current_dir(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .collector.toml"));

    assert!(temp.path().join(".collector.toml").exists());
    Ok(())
}

#[test]
fn test_cli_version() -> Result<()> {
    Command::cargo_bin("collector")?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}
