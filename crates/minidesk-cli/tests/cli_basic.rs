//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with a throwaway config file and verify
//! outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command with optional stdin and return (stdout, stderr, code).
fn run_cli(config: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_minidesk"))
        .args(args)
        .env("MINIDESK_CONFIG", config)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}

#[test]
fn test_cost_json_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir.path().join("config.toml"), &["cost", "--json"], "");
    assert_eq!(code, 0, "cost failed");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["type"], "cost_snapshot");
    assert_eq!(json["breakdown"]["monthly_base"], 118.0);
    assert_eq!(json["breakdown"]["total_spent"], 1456.0);
    assert_eq!(json["breakdown"]["initial_cash_need"], 658.0);
}

#[test]
fn test_cost_coerces_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        &dir.path().join("config.toml"),
        &["cost", "--json", "--monthly-rent", "abc", "--months", "99"],
        "",
    );
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["months"], 48);
    assert_eq!(json["breakdown"]["monthly_base"], 63.0);
}

#[test]
fn test_cost_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir.path().join("config.toml"), &["cost"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("total spent        1,456"));
    assert!(stdout.contains("period balance     976 shortfall"));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (stdout, _, code) = run_cli(&config, &["config", "get", "timer.focus"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_, _, code) = run_cli(&config, &["config", "set", "timer.focus", "50"], "");
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&config, &["config", "get", "timer.focus"], "");
    assert_eq!(stdout.trim(), "50");

    let (_, stderr, code) = run_cli(&config, &["config", "get", "timer.nope"], "");
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_timer_session() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        &dir.path().join("config.toml"),
        &["timer", "--focus", "30"],
        "duration short-rest 10\nmode short-rest\nbogus\nstatus\nquit\n",
    );
    assert_eq!(code, 0);

    let events = json_lines(&stdout);
    let kinds: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(
        kinds,
        vec!["timer_snapshot", "duration_changed", "mode_selected", "timer_snapshot"]
    );
    assert_eq!(events[0]["remaining_secs"], 1800);
    assert_eq!(events[3]["mode"], "short-rest");
    assert_eq!(events[3]["display"], "10:00");
    assert_eq!(events[3]["label"], "Short Rest");
    assert_eq!(events[3]["rest"], true);
}

#[test]
fn test_board_session() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        &dir.path().join("config.toml"),
        &["board", "--seed", "7", "--manual"],
        "spawn\nstatus\nreset\nstatus\n",
    );
    assert_eq!(code, 0);

    let events = json_lines(&stdout);
    assert_eq!(events[0]["type"], "tile_spawned");
    assert_eq!(events[0]["value"], 1);
    assert_eq!(events[1]["type"], "tile_spawned");
    assert_eq!(events[2]["type"], "board_snapshot");
    assert_eq!(events[2]["spawn_count"], 2);
    assert_eq!(events[3]["type"], "board_reset");
    assert_eq!(events[4]["spawn_count"], 0);
    assert_eq!(events[4]["max_value"], serde_json::Value::Null);
}
