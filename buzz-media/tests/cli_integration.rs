//! CLI integration tests for buzz-media

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn buzz_media(env: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("buzz-media").unwrap();
    cmd.env("BUZZ_CONFIG", env.path().join("config.toml"))
        .env("BUZZ_DATA_DIR", env.path().join("data"))
        .env_remove("BUZZ_TOKEN")
        .env_remove("BUZZ_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// A 200x100 PNG
fn wide_png(env: &TempDir) -> PathBuf {
    let path = env.path().join("banner.png");
    image::RgbImage::new(200, 100).save(&path).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("buzz-media").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("canva"))
        .stdout(predicate::str::contains("disconnect"));
}

#[test]
fn test_inspect_reports_presets() {
    let env = TempDir::new().unwrap();
    let path = wide_png(&env);

    buzz_media(&env)
        .arg("inspect")
        .arg(&path)
        .args(["--platform", "twitter,instagram"])
        .assert()
        .success()
        .stdout(predicate::str::contains("banner.png\timage/png"))
        .stdout(predicate::str::contains("200x100"))
        .stdout(predicate::str::contains("twitter: standard 1200x675 (resize needed)"))
        .stdout(predicate::str::contains(
            "instagram: landscape 1080x566 (resize needed) aspect ratio not accepted",
        ));
}

#[test]
fn test_inspect_json() {
    let env = TempDir::new().unwrap();
    let path = wide_png(&env);

    let output = buzz_media(&env)
        .args(["inspect", "--format", "json", "--platform", "linkedin"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &reports[0];
    assert_eq!(report["dimensions"], "200x100");
    assert_eq!(report["platforms"][0]["platform"], "linkedin");
    assert_eq!(report["platforms"][0]["image_type"], "horizontal");
    assert_eq!(report["platforms"][0]["aspect_ratio_ok"], true);
}

#[test]
fn test_inspect_rejects_unsupported_files() {
    let env = TempDir::new().unwrap();
    let good = wide_png(&env);
    let bad = env.path().join("notes.txt");
    fs::write(&bad, "not media").unwrap();

    buzz_media(&env)
        .arg("inspect")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .code(3)
        .stdout(predicate::str::contains("banner.png"))
        .stderr(predicate::str::contains("notes.txt: Unsupported file type"))
        .stderr(predicate::str::contains("1 of 2 file(s) cannot be posted"));
}

#[test]
fn test_unknown_platform() {
    let env = TempDir::new().unwrap();
    let path = wide_png(&env);

    buzz_media(&env)
        .arg("inspect")
        .arg(&path)
        .args(["--platform", "myspace"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unknown platform"));
}

#[test]
fn test_list_rejects_canva() {
    let env = TempDir::new().unwrap();

    buzz_media(&env)
        .args(["list", "canva"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Canva has no file list"));
}

#[test]
fn test_unknown_integration() {
    let env = TempDir::new().unwrap();

    buzz_media(&env)
        .args(["disconnect", "dropbox"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unknown integration 'dropbox'"));
}

#[test]
fn test_network_commands_require_login() {
    let env = TempDir::new().unwrap();

    buzz_media(&env)
        .arg("status")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Not logged in"));
}
