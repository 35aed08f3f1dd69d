//! CLI integration tests
//!
//! Verify the wiring between the CLI and chatlog-core: a replayed event
//! stream must leave the expected log tree behind.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn chatlog_cmd() -> Command {
    Command::cargo_bin("chatlog").expect("failed to find chatlog binary")
}

fn write_stream(dir: &TempDir, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("events.jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn test_replay_builds_log_tree() {
    let work = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let stream = write_stream(
        &work,
        &[
            r##"{"day":5,"seconds":3723,"event":{"type":"chat_sent","sender":"Ann","tag":"#town","text":"<i>hello</i>"}}"##,
            r#"{"day":5,"seconds":3724,"event":{"type":"player","user":"Bob","kind":"logged_in"}}"#,
            r##"{"day":6,"seconds":10,"event":{"type":"chat_sent","sender":"Ann","tag":"#town","text":"next day"}}"##,
        ],
    );

    chatlog_cmd()
        .arg("replay")
        .arg(&stream)
        .arg("--log-dir")
        .arg(logs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Replayed 3 events (0 skipped)"));

    let town5 = fs::read_to_string(logs.path().join("Channel/town/Day 5.txt")).unwrap();
    assert_eq!(town5, "[01:02:03] Ann: hello\n");

    let town6 = fs::read_to_string(logs.path().join("Channel/town/Day 6.txt")).unwrap();
    assert_eq!(town6, "[00:00:10] Ann: next day\n");

    let login = fs::read_to_string(logs.path().join("Login/Day 5.txt")).unwrap();
    assert_eq!(login, "[01:02:04] Bob logged in.\n");
}

#[test]
fn test_replay_skips_malformed_records() {
    let work = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let stream = write_stream(
        &work,
        &[
            r##"{"day":1,"seconds":1,"event":{"type":"chat_sent","sender":"Ann","tag":"#town","text":"kept"}}"##,
            "this is not json",
            r##"{"day":1,"seconds":2,"event":{"type":"chat_sent","sender":"Ann","tag":"#town","text":"also kept"}}"##,
        ],
    );

    chatlog_cmd()
        .arg("replay")
        .arg(&stream)
        .arg("--log-dir")
        .arg(logs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Replayed 2 events (1 skipped)"));

    let town = fs::read_to_string(logs.path().join("Channel/town/Day 1.txt")).unwrap();
    assert_eq!(town.lines().count(), 2);
}

#[test]
fn test_replay_dms_only_with_flag() {
    let work = TempDir::new().unwrap();
    let stream = write_stream(
        &work,
        &[r#"{"day":1,"seconds":1,"event":{"type":"chat_sent","sender":"Ann","tag":"@Bob","text":"psst"}}"#],
    );

    let without = TempDir::new().unwrap();
    chatlog_cmd()
        .arg("replay")
        .arg(&stream)
        .arg("--log-dir")
        .arg(without.path())
        .assert()
        .success();
    assert!(!without.path().join("DM").exists());

    let with = TempDir::new().unwrap();
    chatlog_cmd()
        .arg("replay")
        .arg(&stream)
        .arg("--log-dir")
        .arg(with.path())
        .arg("--dms")
        .assert()
        .success();
    let dm = fs::read_to_string(with.path().join("DM/Ann-Bob/Day 1.txt")).unwrap();
    assert_eq!(dm, "[00:00:01] Ann: psst\n");
}

#[test]
fn test_replay_empty_stream() {
    let work = TempDir::new().unwrap();
    let stream = write_stream(&work, &[]);

    chatlog_cmd()
        .arg("replay")
        .arg(&stream)
        .assert()
        .success()
        .stdout(predicate::str::contains("No events to replay"));
}

#[test]
fn test_replay_missing_file_fails() {
    chatlog_cmd()
        .arg("replay")
        .arg("/nonexistent/events.jsonl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open event stream"));
}
