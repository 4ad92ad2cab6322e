use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

fn sweeper() -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("sweeper");
    let mut cmd = Command::new(bin);
    cmd.env_remove("SWEEPER_CONTAINER_ID")
        .env_remove("SWEEPER_CONTROL_PORT")
        .env("RUST_LOG", "warn");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf8 output");
    let start = stdout.find('{').expect("json start");
    let end = stdout.rfind('}').expect("json end");
    serde_json::from_str(&stdout[start..=end]).expect("valid json")
}

#[test]
fn scan_suppresses_overview_region() {
    let fixture = Path::new("tests/fixtures/overview_page.json");
    assert!(fixture.exists(), "fixture missing");

    let assert = sweeper()
        .args(["--output", "json", "scan", fixture.to_str().unwrap()])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["action"], "suppressed");
    assert_eq!(value["container_found"], true);
    assert_eq!(value["region"]["id"], "overview");
    assert_eq!(value["styled_nodes"], 1);
}

#[test]
fn scan_respects_search_form_guard() {
    let assert = sweeper()
        .args([
            "--output",
            "json",
            "scan",
            "tests/fixtures/search_form_page.json",
        ])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["action"], "not_found");
    assert!(value["region"].is_null());
    assert_eq!(value["styled_nodes"], 0);
}

#[test]
fn disabled_scan_with_highlight_only_outlines() {
    let assert = sweeper()
        .args([
            "--output",
            "json",
            "scan",
            "tests/fixtures/overview_page.json",
            "--disabled",
            "--highlight",
        ])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["action"], "disabled");
    assert!(value["styled_nodes"].as_u64().unwrap() > 0);
}

#[test]
fn scan_of_missing_fixture_fails() {
    sweeper()
        .args(["scan", "tests/fixtures/does_not_exist.json"])
        .assert()
        .failure();
}

#[test]
fn watch_replays_frames_until_the_overview_is_hidden() {
    let assert = sweeper()
        .args([
            "--output",
            "json",
            "watch",
            "tests/fixtures/late_overview_frames.json",
            "--frame-delay-ms",
            "20",
            "--ephemeral",
        ])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["frames"], 3);
    assert!(value["episodes"].as_u64().unwrap() >= 1);
    assert_eq!(value["last_outcome"], "resolved");
    let suppressed = value["suppressed"].as_array().unwrap();
    assert_eq!(suppressed.len(), 1);
    assert_eq!(suppressed[0]["id"], "overview");
}

#[test]
fn info_prints_effective_configuration() {
    let assert = sweeper()
        .args(["--output", "json", "info"])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["config"]["container_id"], "main");
    assert_eq!(value["config"]["control_port"], 0);
    assert!(value["build"]["version"].is_string());
}

#[test]
fn watch_without_frame_delay_still_sees_every_frame() {
    let assert = sweeper()
        .args([
            "--output",
            "json",
            "watch",
            "tests/fixtures/late_overview_frames.json",
            "--frame-delay-ms",
            "0",
            "--ephemeral",
        ])
        .assert()
        .success();
    let value = stdout_json(assert.get_output());

    assert_eq!(value["episodes"], 1);
    assert_eq!(value["last_outcome"], "resolved");
    let suppressed = value["suppressed"].as_array().unwrap();
    assert_eq!(suppressed.len(), 1);
    assert_eq!(suppressed[0]["id"], "overview");
}
