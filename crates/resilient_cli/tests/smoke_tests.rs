//! CLI smoke tests: verify basic binary behavior.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

const MISSING_CONFIG: &str = "/tmp/nonexistent_resilient_config_12345.toml";

fn cli_bin() -> Command {
    cli_bin_with_config(Path::new(MISSING_CONFIG))
}

fn cli_bin_with_config(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_resilient"));
    cmd.env_remove("RUST_LOG")
        .env_remove("RESILIENT_LOG_LEVEL")
        .env_remove("RESILIENT_LOG_JSON")
        .arg("--config")
        .arg(config);
    cmd
}

fn status_of(stdout: &[u8]) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(stdout);
    serde_json::from_str(stdout.trim()).expect("status json")
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage"),
        "Expected usage info in --help output"
    );
    assert!(stdout.contains("simulate"));
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("resilient"),
        "Expected crate name in --version output"
    );
}

#[test]
fn test_feed_prints_status_json() {
    let output = cli_bin()
        .args(["feed", "Thank you so much!", "I am so angry and tired"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let status: serde_json::Value = serde_json::from_str(stdout.trim()).expect("status json");
    assert_eq!(status["stress"], 0.02);
    assert_eq!(status["memory_count"], 2);
}

#[test]
fn test_feed_reads_stdin() {
    let mut child = cli_bin()
        .arg("feed")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"bad\nbad\nthanks\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("failed to wait");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let status: serde_json::Value = serde_json::from_str(stdout.trim()).expect("status json");
    // 0.02 + 0.02 - 0.05 floors at zero
    assert_eq!(status["stress"], 0.0);
    assert_eq!(status["memory_count"], 3);
}

#[test]
fn test_chat_session() {
    let mut child = cli_bin()
        .arg("chat")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"I hate this\n\n:memories\nquit\nnever processed\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("failed to wait");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stress=0.020 memories=1"), "got: {}", stdout);
    assert!(stdout.contains("  0: I hate this"), "got: {}", stdout);
    assert!(!stdout.contains("memories=2"));
}

#[test]
fn test_simulate_emits_samples() {
    let output = cli_bin()
        .args(["simulate", "--steps", "3000", "--sample-every", "1000", "--seed", "5"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let samples: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("sample json"))
        .collect();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[2]["step"], 3000);
}

#[test]
fn test_invalid_config_does_not_panic() {
    // A nonexistent config file falls back to defaults
    let output = cli_bin()
        .args(["feed", "ok"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());
}

#[test]
fn test_malformed_config_is_reported_on_stderr() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[logging\nlevel = \"debug\"").unwrap();

    let output = cli_bin_with_config(config.path())
        .args(["feed", "ok"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid config file"), "got: {}", stderr);
    assert!(stderr.contains("Failed to parse TOML config"), "got: {}", stderr);
    assert_eq!(status_of(&output.stdout)["memory_count"], 1);
}

#[test]
fn test_feed_reads_file() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(input, "bad\nthanks\nok\n").unwrap();

    let output = cli_bin()
        .arg("feed")
        .arg("--file")
        .arg(input.path())
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let status = status_of(&output.stdout);
    assert_eq!(status["stress"], 0.0);
    assert_eq!(status["memory_count"], 3);
}

#[test]
fn test_feed_processes_texts_before_file() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(input, "thanks\nangry\n").unwrap();

    // bad, thanks, angry -> 0.02; file first would give thanks, angry, bad -> 0.04
    let output = cli_bin()
        .args(["feed", "bad", "--file"])
        .arg(input.path())
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let status = status_of(&output.stdout);
    assert_eq!(status["stress"], 0.02);
    assert_eq!(status["memory_count"], 3);
}

#[test]
fn test_feed_missing_file_fails() {
    let output = cli_bin()
        .args(["feed", "--file", "/tmp/nonexistent_resilient_input_12345.txt"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read input file"), "got: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_chat_status_command() {
    let mut child = cli_bin()
        .arg("chat")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b":status\nbad\n:status\nquit\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("failed to wait");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    // :status on a fresh tracker does not store anything
    assert!(stdout.contains("stress=0.000 memories=0"), "got: {}", stdout);
    // Once after processing "bad", once more for :status
    assert_eq!(stdout.matches("stress=0.020 memories=1").count(), 2, "got: {}", stdout);
}

#[test]
fn test_json_logs_flag() {
    let output = cli_bin()
        .args(["--json-logs", "feed", "ok"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty(), "expected log lines on stderr");
    for line in lines {
        let entry: serde_json::Value = serde_json::from_str(line)
            .unwrap_or_else(|e| panic!("not a JSON log line ({}): {}", e, line));
        assert!(entry.get("level").is_some(), "got: {}", line);
    }
}
