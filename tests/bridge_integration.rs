//! Integration tests for the process bridge against real subprocesses.
//!
//! Each test writes a small shell script to a temp directory and points
//! the bridge at it, exercising the timeout, exit-status, stdin framing
//! and stdout line-scan behaviour end to end.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use rust_coach_mcp::analysis::AnalysisRequest;
use rust_coach_mcp::bridge::{AnalysisOutcome, AnalyzerBridge};
use tempfile::TempDir;

fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn request() -> AnalysisRequest {
    AnalysisRequest {
        code: "fn main() {}".to_string(),
        file_name: Some("main.rs".to_string()),
    }
}

#[tokio::test]
async fn well_behaved_analyzer_succeeds() {
    let dir = TempDir::new().unwrap();
    // Consumes stdin, then emits one report line.
    let script = write_script(
        &dir,
        "analyzer.sh",
        "#!/bin/sh\ncat > /dev/null\necho '{\"diagnostics\":[],\"suggestions\":[],\"explanation\":\"clean\"}'\n",
    );

    let bridge = AnalyzerBridge::new(Some(script), Duration::from_secs(5));
    let outcome = bridge.analyze(&request()).await;

    let AnalysisOutcome::Success(report) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(report.explanation, "clean");
}

#[tokio::test]
async fn request_payload_arrives_on_stdin() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "analyzer.sh",
        concat!(
            "#!/bin/sh\n",
            "input=$(cat)\n",
            "case \"$input\" in\n",
            "  *\"fn main\"*) echo '{\"diagnostics\":[],\"suggestions\":[],\"explanation\":\"saw code\"}' ;;\n",
            "  *) echo '{\"diagnostics\":[],\"suggestions\":[],\"explanation\":\"no code\"}' ;;\n",
            "esac\n",
        ),
    );

    let bridge = AnalyzerBridge::new(Some(script), Duration::from_secs(5));
    let AnalysisOutcome::Success(report) = bridge.analyze(&request()).await else {
        panic!("expected success");
    };
    assert_eq!(report.explanation, "saw code");
}

#[tokio::test]
async fn leading_stdout_noise_is_skipped() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "analyzer.sh",
        concat!(
            "#!/bin/sh\n",
            "cat > /dev/null\n",
            "echo 'starting analyzer v1.2'\n",
            "echo 'loaded 42 lints'\n",
            "echo '{\"diagnostics\":[],\"suggestions\":[],\"explanation\":\"after noise\"}'\n",
        ),
    );

    let bridge = AnalyzerBridge::new(Some(script), Duration::from_secs(5));
    let AnalysisOutcome::Success(report) = bridge.analyze(&request()).await else {
        panic!("expected success despite stdout noise");
    };
    assert_eq!(report.explanation, "after noise");
}

#[tokio::test]
async fn non_json_stdout_is_a_parse_failure() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "analyzer.sh",
        "#!/bin/sh\ncat > /dev/null\necho 'hello world'\n",
    );

    let bridge = AnalyzerBridge::new(Some(script), Duration::from_secs(5));
    let AnalysisOutcome::Degraded(diag) = bridge.analyze(&request()).await else {
        panic!("expected degraded outcome");
    };
    assert!(diag
        .message
        .contains("Failed to parse analysis response"));
}

#[tokio::test]
async fn nonzero_exit_embeds_stderr() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "analyzer.sh",
        "#!/bin/sh\ncat > /dev/null\necho boom >&2\nexit 1\n",
    );

    let bridge = AnalyzerBridge::new(Some(script), Duration::from_secs(5));
    let AnalysisOutcome::Degraded(diag) = bridge.analyze(&request()).await else {
        panic!("expected degraded outcome");
    };
    assert!(diag.message.contains("boom"));
    assert_eq!(diag.source.as_deref(), Some("bridge"));
}

#[tokio::test]
async fn deadline_kills_slow_analyzer() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "analyzer.sh", "#!/bin/sh\nsleep 30\n");

    let bridge = AnalyzerBridge::new(Some(script), Duration::from_millis(200));
    let started = Instant::now();
    let outcome = bridge.analyze(&request()).await;
    let elapsed = started.elapsed();

    let AnalysisOutcome::Degraded(diag) = outcome else {
        panic!("expected degraded outcome");
    };
    assert!(diag.message.contains("Analysis timed out"));
    // Deadline plus bounded overhead, nowhere near the child's sleep.
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
}

#[tokio::test]
async fn directory_as_binary_degrades() {
    let dir = TempDir::new().unwrap();
    let bridge = AnalyzerBridge::new(Some(dir.path().to_path_buf()), Duration::from_secs(5));
    let AnalysisOutcome::Degraded(diag) = bridge.analyze(&request()).await else {
        panic!("expected degraded outcome");
    };
    assert!(diag.message.contains("service is unavailable"));
}

#[tokio::test]
async fn non_executable_file_degrades() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analyzer.sh");
    std::fs::write(&path, "#!/bin/sh\n").unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o644);
    std::fs::set_permissions(&path, perms).unwrap();

    let bridge = AnalyzerBridge::new(Some(path), Duration::from_secs(5));
    let AnalysisOutcome::Degraded(diag) = bridge.analyze(&request()).await else {
        panic!("expected degraded outcome");
    };
    assert!(diag.message.contains("service is unavailable"));
}
