//! CLI integration tests
use predicates::prelude::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const CHAT_URL: &str = "https://chatgpt.com/c/6701c0de-1234-abcd";

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("contextprompt")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn json_output(args: &[&str]) -> serde_json::Value {
    let output = cmd().args(args).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_file_input() {
    cmd()
        .arg(get_fixture_path("article.html"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Ownership in Practice"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("article.html")).unwrap();
    cmd()
        .write_stdin(html.clone())
        .assert()
        .success()
        .stdout(predicate::str::contains("## Borrowing"));
    cmd().arg("-").write_stdin(html).assert().success();
}

#[test]
fn test_cli_depth_flag() {
    cmd()
        .args(["--depth", "light", &get_fixture_path("article.html")])
        .assert()
        .success();
}

#[test]
fn test_cli_invalid_depth() {
    cmd()
        .args(["--depth", "extreme", &get_fixture_path("article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown capture depth"));
}

#[test]
fn test_cli_no_links() {
    cmd()
        .args(["--no-links", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("the book for details"))
        .stdout(predicate::str::contains("](https://doc.rust-lang.org").not());
}

#[test]
fn test_cli_chat_format() {
    cmd()
        .args(["-f", "chat", "--url", CHAT_URL, &get_fixture_path("chatgpt.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("**Assistant**:\nTurn 6 "))
        .stdout(predicate::str::contains("**User**:\nTurn 25 "));
}

#[test]
fn test_cli_chat_requires_url() {
    cmd()
        .args(["-f", "chat", &get_fixture_path("chatgpt.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url is required"));
}

#[test]
fn test_cli_chat_unknown_host() {
    cmd()
        .args(["-f", "chat", "--url", "https://example.com/c/1", &get_fixture_path("chatgpt.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a known chat platform"));
}

#[test]
fn test_cli_invalid_url() {
    cmd()
        .args(["--url", "not a url", &get_fixture_path("article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --url"));
}

#[test]
fn test_cli_json_format() {
    let json = json_output(&[
        "-f",
        "json",
        "--url",
        CHAT_URL,
        "--selection",
        "  sorted  ",
        "--depth",
        "deep",
        &get_fixture_path("chatgpt.html"),
    ]);

    assert_eq!(json["success"], true);
    let context = &json["context"];
    assert_eq!(context["platformName"], "ChatGPT");
    assert_eq!(context["isPrivateLink"], true);
    assert_eq!(context["captureDepth"], "deep");
    assert_eq!(context["selection"], "sorted");
    assert_eq!(context["url"], CHAT_URL);
    assert!(context["timestamp"].as_str().is_some());
}

#[test]
fn test_cli_json_empty_page_succeeds() {
    let json = json_output(&["-f", "json", &get_fixture_path("empty.html")]);
    assert_eq!(json["success"], true);
    assert_eq!(json["context"]["mainContent"], "");
    assert_eq!(json["context"]["platformName"], serde_json::Value::Null);
}

#[test]
fn test_cli_empty_content() {
    cmd()
        .arg(get_fixture_path("empty.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No content could be extracted"));
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.md");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(get_fixture_path("boilerplate.html"))
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("# Spring Planting Begins"));
}

#[test]
fn test_cli_invalid_file() {
    cmd().arg("nonexistent.html").assert().failure();
}

#[test]
fn test_cli_platform_override() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"platforms":[{{"hosts":["chat.example.org"],"displayName":"Internal Chat","messageSelectors":["[data-message-author-role]"]}}]}}"#
    )
    .unwrap();

    let json = json_output(&[
        "-f",
        "json",
        "--url",
        "https://chat.example.org/c/1",
        "--platforms",
        file.path().to_str().unwrap(),
        &get_fixture_path("chatgpt.html"),
    ]);
    assert_eq!(json["context"]["platformName"], "Internal Chat");
    assert_eq!(json["context"]["isPrivateLink"], false);
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("ContextPrompt"))
        .stderr(predicate::str::contains("fast-path"))
        .stderr(predicate::str::contains("Keyword table"))
        .stderr(predicate::str::contains("Chat hosts"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("contextprompt"));
}
