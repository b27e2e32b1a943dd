//! Binary-level checks: argument handling, exit codes and output.

use assert_cmd::Command;
use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use predicates::prelude::*;
use serde_json::json;
use std::io::Write;

fn admin() -> Command {
    let mut cmd = Command::cargo_bin("mamotama-admin").unwrap();
    cmd.env_remove("MAMOTAMA_API_BASE")
        .env_remove("MAMOTAMA_API_KEY")
        .env_remove("MAMOTAMA_START_PAGE")
        .env_remove("RUST_LOG");
    cmd
}

async fn stub(uri: Uri) -> impl IntoResponse {
    match uri.path() {
        "/mamotama-api/status" => (StatusCode::OK, Json(json!({ "status": "running" }))),
        "/mamotama-api/bypass-rules:validate" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "ok": false, "messages": ["line 1: path must start with '/'"] })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))),
    }
}

async fn spawn_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new().fallback(stub)).await.unwrap();
    });
    format!("http://{}/mamotama-api", addr)
}

#[test]
fn test_help_lists_commands() {
    admin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("logs"))
        .stdout(predicate::str::contains("bypass-rules"))
        .stdout(predicate::str::contains("cache-rules"));
}

#[test]
fn test_rejects_non_http_base() {
    admin()
        .args(["--api-base", "ftp://127.0.0.1/mamotama-api", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[X]"))
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_unreachable_backend_fails() {
    admin()
        .args(["--api-base", "http://127.0.0.1:9/mamotama-api", "--api-key", "k", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch status"));
}

#[test]
fn test_unknown_start_page_is_refused() {
    admin()
        .args(["--api-key", "k", "tui", "--page", "/settings"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown page: /settings"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_prints_json() {
    let base = spawn_stub().await;

    let assert = tokio::task::spawn_blocking(move || {
        admin().args(["--api-base", &base, "--api-key", "k", "status"]).assert()
    })
    .await
    .unwrap();

    assert.success().stdout(predicate::str::contains("\"running\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_validation_exits_non_zero() {
    let base = spawn_stub().await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "healthz").unwrap();
    let path = file.path().to_path_buf();

    let assert = tokio::task::spawn_blocking(move || {
        admin()
            .args(["--api-base", &base, "--api-key", "k", "bypass-rules", "validate", "--file"])
            .arg(&path)
            .assert()
    })
    .await
    .unwrap();

    assert
        .failure()
        .stdout(predicate::str::contains("[NG] Validation failed"))
        .stdout(predicate::str::contains("line 1"));
    drop(file);
}
