//
//  bosh-cli
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/10.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Director address nothing listens on; commands below fail before using it.
const UNREACHABLE: &str = "https://127.0.0.1:1";

fn bosh(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bosh").unwrap();
    cmd.env("BOSH_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("BOSH_ENVIRONMENT")
        .env_remove("BOSH_CLIENT")
        .env_remove("BOSH_CLIENT_SECRET")
        .env_remove("BOSH_CA_CERT")
        .env_remove("BOSH_NON_INTERACTIVE")
        .env_remove("BOSH_DEPLOYMENT");
    cmd
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("bosh version "));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload-release"))
        .stdout(predicate::str::contains("cancel-task"))
        .stdout(predicate::str::contains("--environment"));
}

#[test]
fn test_completion_bash() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_bosh"));
}

#[test]
fn test_unknown_command_is_usage_error() {
    let dir = TempDir::new().unwrap();
    bosh(&dir).arg("frobnicate").assert().code(2);
}

#[test]
fn test_tasks_without_environment() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .arg("tasks")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Expected non-empty Director URL"));
}

#[test]
fn test_log_in_requires_alias() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .args(["log-in", "-e", UNREACHABLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("aliased environment"));
}

#[test]
fn test_update_config_missing_file() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .args(["update-config", "--type", "cloud", "-e", UNREACHABLE])
        .arg(dir.path().join("missing.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn test_deploy_manifest_without_name() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("manifest.yml");
    std::fs::write(&manifest, "releases: []\n").unwrap();

    bosh(&dir)
        .args(["deploy", "-e", UNREACHABLE])
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("deployment name"));
}

#[test]
fn test_upload_stemcell_rejects_missing_file() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .args(["upload-stemcell", "./no-such-stemcell.tgz", "-e", UNREACHABLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tarball or an http(s) URL"));
}

#[test]
fn test_delete_config_needs_terminal_to_confirm() {
    let dir = TempDir::new().unwrap();
    bosh(&dir)
        .args(["delete-config", "--type", "runtime", "--name", "dns", "-e", UNREACHABLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("without a terminal"));
}
