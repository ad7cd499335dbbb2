//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomocal"))
        .args(args)
        .env("POMOCAL_DATA_DIR", data_dir)
        .env_remove("POMOCAL_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\nstderr: {stderr}");
    stdout
}

fn list_json(data_dir: &Path, extra: &[&str]) -> Vec<serde_json::Value> {
    let mut args = vec!["event", "list", "--json"];
    args.extend_from_slice(extra);
    let stdout = run_cli_success(data_dir, &args);
    serde_json::from_str::<serde_json::Value>(&stdout)
        .expect("Failed to parse JSON output")
        .as_array()
        .cloned()
        .expect("Expected JSON array")
}

#[test]
fn test_event_add_and_list() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["event", "add", "Study", "--date", "2024-01-01"]);
    assert!(out.contains("Event added:"));

    let events = list_json(dir.path(), &["--date", "2024-01-01"]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Study");
    assert_eq!(events[0]["date"], "2024-01-01");
    assert_eq!(events[0]["done"], false);
}

#[test]
fn test_event_add_blank_title_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["event", "add", "   ", "--date", "2024-01-01"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: nothing added: title is empty"));
    assert!(list_json(dir.path(), &[]).is_empty());
}

#[test]
fn test_event_add_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["event", "add", "x", "--date", "2024-02-30"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid date"));
}

#[test]
fn test_event_toggle_twice_restores() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["event", "add", "Read", "--date", "2024-01-02"]);
    let id = list_json(dir.path(), &[])[0]["id"].as_str().unwrap().to_string();

    run_cli_success(dir.path(), &["event", "toggle", &id]);
    assert_eq!(list_json(dir.path(), &[])[0]["done"], true);

    run_cli_success(dir.path(), &["event", "toggle", &id]);
    assert_eq!(list_json(dir.path(), &[])[0]["done"], false);
}

#[test]
fn test_event_toggle_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["event", "toggle", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: no event with id: nope"));
}

#[test]
fn test_event_list_preserves_insertion_order() {
    let dir = TempDir::new().unwrap();
    for (title, date) in [("a", "2024-01-01"), ("b", "2024-01-02"), ("c", "2024-01-01")] {
        run_cli_success(dir.path(), &["event", "add", title, "--date", date]);
    }
    let titles: Vec<_> = list_json(dir.path(), &["--date", "2024-01-01"])
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["a", "c"]);
    assert!(list_json(dir.path(), &["--date", "2025-01-01"]).is_empty());
}

#[test]
fn test_event_today() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["event", "add", "Now"]);
    let out = run_cli_success(dir.path(), &["event", "today"]);
    assert!(out.contains("Now"));
}

#[test]
fn test_calendar_month_json() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["event", "add", "Dentist", "--date", "2024-03-15"]);
    let out = run_cli_success(dir.path(), &["calendar", "--month", "2024-03", "--json"]);
    let grid: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(grid["month"], "2024-03");
    let days = grid["days"].as_array().unwrap();
    assert_eq!(days.len(), 42);
    let day = days.iter().find(|d| d["date"] == "2024-03-15").unwrap();
    assert_eq!(day["events"][0]["title"], "Dentist");
}

#[test]
fn test_calendar_offset_and_language() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["lang", "set", "en"]);
    let out = run_cli_success(dir.path(), &["calendar", "--month", "2024-01", "--offset", "-1"]);
    assert!(out.starts_with("December 2023"));

    run_cli_success(dir.path(), &["lang", "set", "zh"]);
    let out = run_cli_success(dir.path(), &["calendar", "--month", "2024-01"]);
    assert!(out.starts_with("2024年1月"));
}

#[test]
fn test_calendar_rejects_bad_month() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["calendar", "--month", "2024-13"]);
    assert_eq!(code, 1);
}

#[test]
fn test_lang_defaults_and_toggle() {
    let dir = TempDir::new().unwrap();
    assert_eq!(run_cli_success(dir.path(), &["lang", "get"]).trim(), "zh");
    assert_eq!(run_cli_success(dir.path(), &["lang", "toggle"]).trim(), "en");
    assert_eq!(run_cli_success(dir.path(), &["lang", "get"]).trim(), "en");
    let (_, _, code) = run_cli(dir.path(), &["lang", "set", "fr"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "timer.focus_secs"]).trim(),
        "1500"
    );
    run_cli_success(dir.path(), &["config", "set", "timer.focus_secs", "600"]);
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "timer.focus_secs"]).trim(),
        "600"
    );
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.bogus", "1"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.focus_secs", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_timer_durations_json() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["timer", "durations", "--json"]);
    let durations: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(durations["focus"], "25:00");
    assert_eq!(durations["short_break"], "05:00");
    assert_eq!(durations["long_break"], "15:00");
    assert_eq!(durations["long_break_interval"], 4);
    assert_eq!(durations["auto_resume"], true);
}

/// Run `pomocal` with `input` piped to stdin and return stdout.
fn run_cli_with_stdin(data_dir: &Path, args: &[&str], input: &str) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomocal"))
        .args(args)
        .env("POMOCAL_DATA_DIR", data_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_timer_run_reads_commands_from_stdin() {
    let dir = TempDir::new().unwrap();
    let stdout = run_cli_with_stdin(dir.path(), &["timer", "run"], "s\nq\n");

    assert!(stdout.contains("commands:"));
    assert!(stdout.contains("Short Break"));
    assert!(stdout.contains("05:00"));
}

#[test]
fn test_timer_run_json_output_is_json_lines() {
    let dir = TempDir::new().unwrap();
    let stdout = run_cli_with_stdin(
        dir.path(),
        &["timer", "run", "--json"],
        "a Foo\nt\nx 1\nzzz\na\nq\n",
    );

    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("not JSON: {l:?}: {e}")))
        .collect();

    assert_eq!(lines[0]["type"], "StateSnapshot");
    let added = lines.iter().find(|l| l["type"] == "EventAdded").unwrap();
    assert_eq!(added["event"]["title"], "Foo");

    let todays: Vec<_> = lines.iter().filter(|l| l["type"] == "Today").collect();
    assert_eq!(todays.len(), 2);
    assert_eq!(todays[0]["events"][0]["done"], false);
    assert_eq!(todays[1]["events"][0]["done"], true);

    let messages = lines.iter().filter(|l| l["type"] == "Message").count();
    assert_eq!(messages, 2);
}

#[test]
fn test_timer_run_keeps_events_added_by_other_commands() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomocal"))
        .args(["timer", "run", "--json"])
        .env("POMOCAL_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn timer");
    let mut stdin = child.stdin.take().unwrap();

    // The timer has loaded its events before this one is written.
    stdin.write_all(b"t\n").unwrap();
    stdin.flush().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(300));
    run_cli_success(dir.path(), &["event", "add", "From another terminal"]);

    stdin.write_all(b"a From the timer\nq\n").unwrap();
    drop(stdin);
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let titles: Vec<_> = list_json(dir.path(), &[])
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["From another terminal", "From the timer"]);
}

#[test]
fn test_calendar_huge_offset_fails_fast() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["calendar", "--month", "2024-01", "--offset", "2000000000"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("out of range"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: unknown key: timer.nope"));
}

#[test]
fn test_invalid_config_fails_for_every_timer_command() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[timer]\nfocus_secs = 0\n",
    )
    .unwrap();

    let (_, _, code) = run_cli(dir.path(), &["timer", "durations"]);
    assert_eq!(code, 1);
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "run"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("timer.focus_secs"));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let out = run_cli_success(dir.path(), &["completions", "bash"]);
    assert!(out.contains("pomocal"));
}
