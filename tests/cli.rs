// ABOUTME: Integration tests for the revdeploy CLI commands.
// ABOUTME: Validates --help output, init, package, check, and regions behavior.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn revdeploy_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("revdeploy"));
    for key in [
        "REVDEPLOY_BUCKET",
        "REVDEPLOY_KEY",
        "REVDEPLOY_PATHS",
        "REVDEPLOY_BASE_DIR",
        "REVDEPLOY_APPSPEC",
        "REVDEPLOY_REGION",
        "CODEDEPLOY_S3_BUCKET",
        "CODEDEPLOY_S3_OBJECT_KEY",
        "CODEDEPLOY_REVISION_PATHS",
        "CODEDEPLOY_CUSTOM_APPSPEC",
        "CODEDEPLOY_REGION",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn project(config: &str, files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("revdeploy.yml"), config).unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

#[test]
fn help_shows_commands() {
    revdeploy_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("package"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("regions"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("revdeploy.yml");

    revdeploy_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--application", "shop"])
        .assert()
        .success();

    assert!(config_path.exists(), "revdeploy.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("application: shop"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("revdeploy.yml");

    fs::write(&config_path, "existing: config").unwrap();

    revdeploy_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn package_prints_archive_path() {
    let dir = project(
        "application: shop\npaths: \"appspec.yml, src/** => app\"\ntemp_dir: out\n",
        &[("appspec.yml", "version: 0.0"), ("src/main.py", "print()")],
    );

    revdeploy_cmd()
        .current_dir(dir.path())
        .args(["--output", "quiet", "package"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shop.zip"));

    assert!(dir.path().join("out/shop.zip").exists());
}

#[test]
fn package_without_spec_file_fails() {
    let dir = project(
        "application: shop\npaths: \"src/**\"\ntemp_dir: out\n",
        &[("src/main.py", "print()")],
    );

    revdeploy_cmd()
        .current_dir(dir.path())
        .arg("package")
        .assert()
        .failure()
        .stderr(predicate::str::contains("appspec.yml"));
}

#[test]
fn check_rejects_unknown_region() {
    let dir = project(
        "application: shop\ndeployment_group: prod\nregion: nowhere-1\nbucket: b\nkey: k.zip\n",
        &[],
    );

    revdeploy_cmd()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown region"));
}

#[test]
fn check_accepts_valid_config() {
    let dir = project(
        "application: shop\ndeployment_group: prod\nregion: eu-west-1\nbucket: b\nkey: k.tar\n",
        &[],
    );

    revdeploy_cmd()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn json_output_emits_event_lines() {
    let dir = project(
        "application: shop\ndeployment_group: prod\nbucket: b\nkey: k.zip\n",
        &[],
    );

    let output = revdeploy_cmd()
        .current_dir(dir.path())
        .args(["--output", "json", "check"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for line in stdout.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["event"].is_string());
    }
    assert!(stdout.contains("\"event\":\"success\""));
}

#[test]
fn regions_lists_codes_and_names() {
    revdeploy_cmd()
        .arg("regions")
        .assert()
        .success()
        .stdout(predicate::str::contains("us-east-1"))
        .stdout(predicate::str::contains("eu-west-1"));
}
