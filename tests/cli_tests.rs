//! CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stakebook() -> Command {
    cargo_bin_cmd!("stakebook")
}

fn write_config(dir: &TempDir, extra: &str) -> PathBuf {
    let database = dir.path().join("ledger.db");
    let path = dir.path().join("config.toml");
    let contents = format!(
        "database = {:?}\n\n[logging]\nlevel = \"error\"\n\n{extra}",
        database.display().to_string()
    );
    fs::write(&path, contents).expect("write config");
    path
}

fn run(config: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    stakebook()
        .arg("--config")
        .arg(config)
        .args(args)
        .assert()
}

#[test]
fn help_lists_commands() {
    stakebook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("release"))
        .stdout(predicate::str::contains("outcomes"));
}

#[test]
fn migrate_creates_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "");

    run(&config, &["--json", "migrate"])
        .success()
        .stdout(predicate::str::contains("\"command\":\"migrate\""));
    assert!(dir.path().join("ledger.db").exists());

    run(&config, &["--json", "outcomes"])
        .success()
        .stdout(predicate::str::contains("\"outcomes\":[]"));
}

#[test]
fn maintenance_commands_report_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "");

    run(&config, &["--json", "expire"])
        .success()
        .stdout(predicate::str::contains("\"closed\":0"));
    run(&config, &["--json", "prune"])
        .success()
        .stdout(predicate::str::contains("\"bids_removed\":0"));
}

#[test]
fn unknown_outcome_exits_with_state_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "");

    run(&config, &["spread", "--outcome", "42"]).code(6);
}

#[test]
fn resolve_rejects_unreadable_game_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "");
    let data = dir.path().join("game.json");
    fs::write(&data, "{ not json").unwrap();

    run(
        &config,
        &["resolve", "--outcome", "1", "--data", data.to_str().unwrap()],
    )
    .failure();
}

#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    stakebook()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("migrate")
        .assert()
        .code(1);
}

#[test]
fn invalid_commission_rate_fails_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "[settlement]\ncommission_rate = \"2\"\n");

    run(&config, &["--json", "migrate"])
        .code(1)
        .stderr(predicate::str::contains("commission_rate"));
    assert!(!dir.path().join("ledger.db").exists());
}

#[test]
fn release_requires_wallet_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "");

    run(&config, &["release", "--escrow", "1"]).code(1);
}
