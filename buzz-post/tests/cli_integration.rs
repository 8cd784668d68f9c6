//! CLI integration tests for buzz-post
//!
//! None of these reach the network: every case fails or stops before the
//! backend is contacted.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A JWT whose `exp` is in 2001
const EXPIRED_TOKEN: &str =
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJ1MSIsImV4cCI6MTAwMDAwMDAwMH0.sig";

/// Isolated config and data directories with no saved session
fn setup_test_env() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("data")).unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        r#"
[api]
base_url = "http://127.0.0.1:9"

[defaults]
platforms = ["twitter"]
"#,
    )
    .unwrap();
    temp_dir
}

fn buzz_post(env: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("buzz-post").unwrap();
    cmd.env("BUZZ_CONFIG", env.path().join("config.toml"))
        .env("BUZZ_DATA_DIR", env.path().join("data"))
        .env_remove("BUZZ_TOKEN")
        .env_remove("BUZZ_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_flag_output() {
    let mut cmd = Command::cargo_bin("buzz-post").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Compose, schedule and publish"))
        .stdout(predicate::str::contains("--platform"))
        .stdout(predicate::str::contains("--schedule"))
        .stdout(predicate::str::contains("--check"))
        .stdout(predicate::str::contains("--media"));
}

#[test]
fn test_version_flag_output() {
    let mut cmd = Command::cargo_bin("buzz-post").unwrap();

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("buzz-post"));
}

#[test]
fn test_empty_content_is_rejected() {
    let env = setup_test_env();

    buzz_post(&env)
        .arg("   ")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Content is required"));
}

#[test]
fn test_no_content_and_empty_stdin() {
    let env = setup_test_env();

    buzz_post(&env)
        .write_stdin("")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Content is required"));
}

#[test]
fn test_unknown_platform() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["Hello", "--platform", "twitter,myspace"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unknown platform 'myspace'"));
}

#[test]
fn test_malformed_account() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["Hello", "--account", "instagram"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("expected PLATFORM:ID"));
}

#[test]
fn test_canva_is_not_a_drive() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["Hello", "--drive", "canva:abc"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Canva has no file list"));
}

#[test]
fn test_unknown_canva_export() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["Hello", "--canva-export", "tiff"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unknown export type 'tiff'"));
}

#[test]
fn test_unparseable_schedule() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["Hello", "--schedule", "zzz"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Could not parse schedule"));
}

#[test]
fn test_twice_weekly_rejects_third_day() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["Hello", "--frequency", "2perweek", "--days", "mon,wed,fri"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains(
            "Please select exactly two days for 2 per week scheduling",
        ));
}

#[test]
fn test_unknown_frequency() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["Hello", "--frequency", "hourly"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unknown frequency 'hourly'"));
}

#[test]
fn test_requires_login() {
    let env = setup_test_env();

    buzz_post(&env)
        .arg("Hello world")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_expired_session() {
    let env = setup_test_env();

    buzz_post(&env)
        .env("BUZZ_TOKEN", EXPIRED_TOKEN)
        .arg("Hello world")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Session expired"));
}

#[test]
fn test_invalid_config_offset() {
    let env = setup_test_env();
    fs::write(
        env.path().join("config.toml"),
        r#"
[defaults]
timezone_offset = "IST"
"#,
    )
    .unwrap();

    buzz_post(&env)
        .arg("Hello world")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("defaults.timezone_offset"));
}

#[test]
fn test_from_rejects_malformed_post() {
    let env = setup_test_env();
    let post = env.path().join("post.json");
    fs::write(&post, r#"{"content": "Hi", "platforms": "twitter"#).unwrap();

    buzz_post(&env)
        .arg("--from")
        .arg(&post)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Invalid post file"));
}

#[test]
fn test_from_missing_file() {
    let env = setup_test_env();

    buzz_post(&env)
        .args(["--from", "does-not-exist.json"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Failed to read does-not-exist.json"));
}

#[test]
fn test_from_supplies_content() {
    let env = setup_test_env();
    let post = env.path().join("post.json");
    fs::write(
        &post,
        r#"{"content": "Stored post", "platforms": ["twitter"], "status": "scheduled"}"#,
    )
    .unwrap();

    // Gets past the offline checks and stops at the missing session
    buzz_post(&env)
        .arg("--from")
        .arg(&post)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Not logged in"));

    buzz_post(&env)
        .args(["--from", "-"])
        .write_stdin(r#"{"content": "Piped post"}"#)
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_from_without_content() {
    let env = setup_test_env();
    let post = env.path().join("post.json");
    fs::write(&post, r#"{"content": "  ", "platforms": ["twitter"]}"#).unwrap();

    buzz_post(&env)
        .arg("--from")
        .arg(&post)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Content is required"));
}
