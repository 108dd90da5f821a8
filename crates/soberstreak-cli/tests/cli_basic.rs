//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify its JSON output.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_soberstreak-cli"))
        .env("SOBERSTREAK_DATA_DIR", data_dir)
        .env_remove("SOBERSTREAK_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_status_fresh_install() {
    let dir = tempfile::tempdir().unwrap();
    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["days_since"], 0);
    assert_eq!(status["score"]["score"], 50);
    assert_eq!(status["score"]["label"], "Making Progress");
    assert_eq!(status["achievements"]["unlocked_count"], 0);
    assert_eq!(status["achievements"]["next"]["days_required"], 1);
    assert!(dir.path().join("soberstreak.db").exists());
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_open_twice_same_day() {
    let dir = tempfile::tempdir().unwrap();
    let first = run_json(dir.path(), &["open"]);
    assert_eq!(first[0]["type"], "AppOpened");
    assert_eq!(first[0]["outcome"]["outcome"], "first_open");

    let second = run_json(dir.path(), &["open"]);
    assert_eq!(second.as_array().unwrap().len(), 1);
    assert_eq!(second[0]["outcome"]["outcome"], "same_day");

    let score = run_json(dir.path(), &["score"]);
    assert_eq!(score["score"], 50);
}

#[test]
fn test_relapse_logs_history() {
    let dir = tempfile::tempdir().unwrap();
    let events = run_json(dir.path(), &["relapse", "--note", "stressful day"]);
    assert_eq!(events[0]["type"], "ScoreChanged");
    assert_eq!(events[1]["type"], "StreakReset");

    let score = run_json(dir.path(), &["score"])["score"].as_i64().unwrap();
    assert!((6..=30).contains(&score), "score {score} outside 50-[20,44]");

    let history = run_json(dir.path(), &["history"]);
    let relapses = history["relapses"].as_array().unwrap();
    assert_eq!(relapses.len(), 1);
    assert_eq!(relapses[0]["note"], "stressful day");
}

#[test]
fn test_achievements_list_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let list = run_json(dir.path(), &["achievements", "list"]);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 12);
    assert!(list.iter().all(|a| a["unlocked"] == false));

    let reset = run_json(dir.path(), &["achievements", "reset"]);
    assert_eq!(reset[0]["reset_count"], 1);
    let reset = run_json(dir.path(), &["achievements", "reset"]);
    assert_eq!(reset[0]["reset_count"], 2);

    let next = run_json(dir.path(), &["achievements", "next"]);
    assert_eq!(next["next"]["title"], "First Step");
}

#[test]
fn test_journal_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["journal", "add", "hard day", "--mood", "9"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("mood"));

    let entry = run_json(dir.path(), &["journal", "add", "went for a run", "--mood", "4"]);
    assert_eq!(entry["mood"], 4);

    let entries = run_json(dir.path(), &["journal", "list"]);
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["text"], "went for a run");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "set", "rng.seed", "7"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "rng.seed"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "7");

    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "scoring.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));

    let (code, _, _) = run_cli(
        dir.path(),
        &["config", "set", "scoring.relapse_penalty_min", "99"],
    );
    assert_ne!(code, 0);
}
