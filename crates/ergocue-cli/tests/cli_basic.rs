//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_ergocue"))
        .args(args)
        .env("ERGOCUE_DATA_DIR", data_dir.path())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

#[test]
fn test_settings_get_default() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(&dir, &["settings", "get", "exercise.min_minutes"]);
    assert_eq!(out.trim(), "30");
    assert!(dir.path().join("settings.json").exists());
}

#[test]
fn test_settings_set_persists() {
    let dir = TempDir::new().unwrap();
    run_cli_success(&dir, &["settings", "set", "position.max_minutes", "150"]);
    let out = run_cli_success(&dir, &["settings", "get", "position.max_minutes"]);
    assert_eq!(out.trim(), "150");
}

#[test]
fn test_settings_set_rejects_invalid_interval() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["settings", "set", "exercise.min_minutes", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
    let out = run_cli_success(&dir, &["settings", "get", "exercise.min_minutes"]);
    assert_eq!(out.trim(), "30");
}

#[test]
fn test_settings_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["settings", "get", "nope.nothing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_cue_add_and_disable() {
    let dir = TempDir::new().unwrap();
    let id = run_cli_success(&dir, &["cue", "add", "floor-stretch", "Cobra"]);
    let id = id.trim();
    run_cli_success(&dir, &["cue", "disable", id]);

    let json = run_cli_success(&dir, &["cue", "list", "--json"]);
    let cues: serde_json::Value = serde_json::from_str(&json).unwrap();
    let added = cues
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == id)
        .unwrap();
    assert_eq!(added["type"], "floor_stretch");
    assert_eq!(added["enabled"], false);
}

#[test]
fn test_stats_summary_empty() {
    let dir = TempDir::new().unwrap();
    let json = run_cli_success(&dir, &["stats", "summary"]);
    let summary: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(summary["totals"]["completed"], 0);
}

#[test]
fn test_progress_show() {
    let dir = TempDir::new().unwrap();
    let json = run_cli_success(&dir, &["progress", "show"]);
    let progress: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(progress["level"], 1);
    assert_eq!(progress["xp_for_next_level"], 500);
}

#[test]
fn test_leaderboard_disabled_without_url() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["leaderboard", "top"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("disabled"));
}

/// Start the foreground loop with piped stdio.
fn spawn_run(data_dir: &TempDir, extra: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_ergocue"))
        .arg("run")
        .args(extra)
        .env("ERGOCUE_DATA_DIR", data_dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start run loop")
}

/// Feed `input` to the loop, wait for it to exit, and return the parsed events.
fn run_loop(data_dir: &TempDir, extra: &[&str], input: &[u8]) -> Vec<serde_json::Value> {
    let mut child = spawn_run(data_dir, extra);
    child.stdin.take().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "run loop failed\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .collect()
}

fn count_type(events: &[serde_json::Value], kind: &str) -> usize {
    events.iter().filter(|e| e["type"] == kind).count()
}

#[test]
fn test_run_set_persists_and_restarts() {
    let dir = TempDir::new().unwrap();
    let events = run_loop(&dir, &["--seed", "3"], b"set exercise.min_minutes 5\nquit\n");
    assert_eq!(count_type(&events, "scheduler_started"), 2);

    let out = run_cli_success(&dir, &["settings", "get", "exercise.min_minutes"]);
    assert_eq!(out.trim(), "5");
}

#[test]
fn test_run_set_rejects_invalid_value() {
    let dir = TempDir::new().unwrap();
    let events = run_loop(&dir, &[], b"set exercise.min_minutes 0\nstatus\nquit\n");
    assert_eq!(count_type(&events, "scheduler_started"), 1);
    assert_eq!(count_type(&events, "state_snapshot"), 1);

    let out = run_cli_success(&dir, &["settings", "get", "exercise.min_minutes"]);
    assert_eq!(out.trim(), "30");
}

#[test]
fn test_run_reload_keeps_external_edit() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_run(&dir, &["--seed", "5"]);
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    // Wait until the loop has loaded its settings.
    let mut first = String::new();
    stdout.read_line(&mut first).unwrap();
    assert!(first.contains("scheduler_started"));

    run_cli_success(&dir, &["settings", "set", "exercise.min_minutes", "5"]);

    // A position change saves the loop's settings; after reload they include the edit.
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"reload\nposition floor\nquit\n").unwrap();
    drop(stdin);

    let rest: Vec<String> = stdout.lines().map_while(Result::ok).collect();
    assert!(child.wait().unwrap().success());
    assert!(rest.iter().any(|l| l.contains("scheduler_started")));
    assert!(rest.iter().any(|l| l.contains("position_changed")));

    let out = run_cli_success(&dir, &["settings", "get", "exercise.min_minutes"]);
    assert_eq!(out.trim(), "5");
    let out = run_cli_success(&dir, &["settings", "get", "current_position"]);
    assert_eq!(out.trim(), "floor");
}

#[test]
fn test_run_survives_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let events = run_loop(&dir, &[], b"\xff\xfe\nstatus\nquit\n");
    assert_eq!(count_type(&events, "state_snapshot"), 1);
    assert_eq!(
        events.last().and_then(|e| e["type"].as_str()),
        Some("scheduler_stopped")
    );
}

#[test]
fn test_run_always_active_flag() {
    let dir = TempDir::new().unwrap();
    let events = run_loop(&dir, &["--always-active"], b"trigger\nstatus\nquit\n");
    let snapshot = events
        .iter()
        .find(|e| e["type"] == "state_snapshot")
        .unwrap();
    assert!(snapshot["cue_countdown_secs"].is_u64());
}

#[test]
fn test_run_trigger_and_complete() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_ergocue"))
        .args(["run", "--seed", "7"])
        .env("ERGOCUE_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start run loop");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"trigger\ncomplete\nstatus\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let types: Vec<String> = stdout
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .filter_map(|v| v["type"].as_str().map(str::to_string))
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("scheduler_started"));
    assert!(types.iter().any(|t| t == "cue_ready"));
    assert!(types.iter().any(|t| t == "cue_completed"));
    assert!(types.iter().any(|t| t == "state_snapshot"));
    assert_eq!(types.last().map(String::as_str), Some("scheduler_stopped"));
}
