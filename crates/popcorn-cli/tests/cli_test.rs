#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use std::path::Path;
use std::process::Output;

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runs the binary off the async runtime so the mock server keeps serving.
async fn run_popcorn(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        let mut cmd = cargo_bin_cmd!("popcorn");
        cmd.args(&args)
            .env_remove("RUST_LOG")
            .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT");
        cmd.output().unwrap()
    })
    .await
    .unwrap()
}

fn args(base_url: &str, dir: &Path, rest: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = rest.iter().map(|s| String::from(*s)).collect();
    args.extend([
        String::from("--base-url"),
        String::from(base_url),
        String::from("--dir"),
        dir.display().to_string(),
    ]);
    args
}

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("popcorn");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pages"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("random"))
        .stdout(predicate::str::contains("get"));
}

#[test]
fn test_search_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("popcorn");
    cmd.args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sort"))
        .stdout(predicate::str::contains("--query"));
}

#[test]
fn test_pages_missing_tab() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("popcorn");
    cmd.arg("pages")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--tab"));
}

#[test]
fn test_unknown_tab_is_rejected() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("popcorn");
    cmd.args(["pages", "--tab", "series"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tab: series"));
}

#[test]
fn test_get_missing_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("popcorn");
    cmd.args(["get", "--tab", "movie"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ID>"));
}

#[test]
fn test_invalid_base_url() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("popcorn");
    cmd.args(["pages", "--tab", "show", "--base-url", "not a url", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid base URL"));
}

#[test]
fn test_config_init_then_show() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut init = cargo_bin_cmd!("popcorn");
    init.args(["config", "init", "--dir"])
        .arg(dir.path())
        .assert()
        .success();
    assert!(dir.path().join("config.toml").exists());

    let mut show = cargo_bin_cmd!("popcorn");
    show.args(["config", "show", "--dir"])
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::contains("tv-v2.api-fetch.sh"));

    let mut again = cargo_bin_cmd!("popcorn");
    again
        .args(["config", "init", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file already exists"));
}

#[tokio::test]
async fn test_pages_against_mock_server() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shows"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/popcorn/shows.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    // Act
    let output = run_popcorn(args(
        &mock_server.uri(),
        dir.path(),
        &["pages", "--tab", "show"],
    ))
    .await;

    // Assert
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Pages: 4"));
}

#[tokio::test]
async fn test_search_against_mock_server() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shows/2"))
        .and(query_param("keywords", "the office"))
        .and(query_param("sort", "year"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/popcorn/shows_page_1.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    // Act
    let output = run_popcorn(args(
        &mock_server.uri(),
        dir.path(),
        &[
            "search", "--tab", "show", "--page", "2", "--sort", "year", "--query",
            "the office",
        ],
    ))
    .await;

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Game of Thrones"));
    assert!(stdout.contains("Total: 3 entries"));
}

#[tokio::test]
async fn test_get_raw_against_mock_server() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/tt1375666"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("../../../fixtures/popcorn/random_movie.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    // Act
    let output = run_popcorn(args(
        &mock_server.uri(),
        dir.path(),
        &["get", "--tab", "movie", "tt1375666", "--raw"],
    ))
    .await;

    // Assert
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"certification\": \"PG-13\""));
}

#[tokio::test]
async fn test_malformed_response_fails() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    // Act
    let output = run_popcorn(args(
        &mock_server.uri(),
        dir.path(),
        &["random", "--tab", "anime"],
    ))
    .await;

    // Assert
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to fetch random entry"));
}
