//! Integration tests for the CLI
//!
//! Everything here runs offline: no embedding service, no generation
//! providers, no remote vector service. The pipeline is expected to come
//! up anyway and degrade instead of refusing to start.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn semu_cmd(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("semu").unwrap();
    cmd.env("SEMU_DATA_DIR", data_dir.path())
        .env("SEMU_CONFIG", data_dir.path().join("no-config.yaml"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("SEMU_VECTOR_URL");
    cmd
}

#[test]
fn test_status_cli_format() {
    let data_dir = TempDir::new().unwrap();
    semu_cmd(&data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Retrieval:"))
        .stdout(predicate::str::contains("local index"))
        .stdout(predicate::str::contains("(none configured)"));
}

#[test]
fn test_status_json_format() {
    let data_dir = TempDir::new().unwrap();
    let output = semu_cmd(&data_dir)
        .arg("status")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["generation"]["configured"], false);
    assert_eq!(status["retrieval"]["ready"], false);
    assert_eq!(status["embedding"]["dimensions"], 1024);
}

#[test]
fn test_index_empty_corpus() {
    let data_dir = TempDir::new().unwrap();
    semu_cmd(&data_dir)
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 0 documents"));
}

#[test]
fn test_ask_requires_question() {
    let data_dir = TempDir::new().unwrap();
    semu_cmd(&data_dir).arg("ask").assert().failure();
}

#[test]
fn test_classify_degrades_without_providers() {
    // no providers configured: the fixed unavailable answer cannot be
    // parsed, so classification lands in the low-confidence OTH fallback
    let data_dir = TempDir::new().unwrap();
    let output = semu_cmd(&data_dir)
        .arg("classify")
        .arg("점심 식사")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let classification: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(classification["category_code"], "OTH");
    assert_eq!(classification["category_name"], "기타");
    assert_eq!(classification["generation"]["provider"], "none");
}
