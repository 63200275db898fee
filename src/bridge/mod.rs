//! External analyzer process bridge.
//!
//! Executes one analysis request by spawning the configured analyzer
//! binary, writing the request as JSON to its stdin, and parsing one JSON
//! report from its stdout under a deadline.
//!
//! # Contract
//!
//! The bridge never fails past its own boundary. Every failure mode —
//! missing binary, spawn error, deadline expiry, non-zero exit, malformed
//! output — is normalised into [`AnalysisOutcome::Degraded`] carrying one
//! synthetic diagnostic whose message encodes the cause. Callers always
//! receive a structurally valid outcome; only its content may indicate
//! failure.
//!
//! # Subprocess protocol
//!
//! One process per request, never shared or pooled. The request is a
//! single JSON object on stdin (stdin is closed after the write); the
//! reply is expected as a single JSON object line on stdout. Analyzers
//! tend to emit incidental log noise on stdout, so the reader scans
//! line-by-line and the first syntactically complete JSON object decides
//! the outcome. This line-scan is a resilience measure, not a framing
//! protocol — a candidate object with missing or mistyped report fields is
//! a parse failure, not a reason to keep scanning.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::analysis::{AnalysisReport, AnalysisRequest, Diagnostic};

/// Deadline applied to one analyzer run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Component tag recorded in `Diagnostic::source` for bridge findings.
pub const BRIDGE_SOURCE: &str = "bridge";

const UNAVAILABLE_MESSAGE: &str = "Rust analysis service is unavailable";
const TIMEOUT_MESSAGE: &str = "Analysis timed out";

/// The result of one bridge invocation.
///
/// `Degraded` is a normal, expected outcome in environments without the
/// external analyzer — it is not an error and must not be treated as one.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// The analyzer ran and produced a well-formed report.
    Success(AnalysisReport),
    /// The analyzer could not produce a report; the diagnostic explains why.
    Degraded(Diagnostic),
}

impl AnalysisOutcome {
    /// Flattens the outcome into a report plus a degraded flag.
    ///
    /// A degraded outcome becomes a report with the synthetic diagnostic as
    /// its only finding and the failure cause as its explanation.
    #[must_use]
    pub fn into_report(self) -> (AnalysisReport, bool) {
        match self {
            Self::Success(report) => (report, false),
            Self::Degraded(diagnostic) => {
                let explanation = diagnostic.message.clone();
                (
                    AnalysisReport {
                        diagnostics: vec![diagnostic],
                        suggestions: Vec::new(),
                        explanation,
                    },
                    true,
                )
            }
        }
    }

    /// Whether this outcome is degraded.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Bridge to the external analyzer binary.
#[derive(Debug, Clone)]
pub struct AnalyzerBridge {
    binary_path: Option<PathBuf>,
    timeout: Duration,
}

impl AnalyzerBridge {
    /// Creates a bridge for the given binary path and deadline.
    #[must_use]
    pub const fn new(binary_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary_path,
            timeout,
        }
    }

    /// Creates a bridge with no binary configured; every invocation
    /// degrades. Useful for tests and bare environments.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self::new(None, DEFAULT_TIMEOUT)
    }

    /// Runs one analysis request through the external analyzer.
    ///
    /// Never fails: every failure mode is folded into a `Degraded` outcome.
    /// The spawned process is guaranteed to be gone by the time this
    /// returns, on every path.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        let Some(path) = &self.binary_path else {
            tracing::debug!("no analyzer binary configured");
            return degraded(UNAVAILABLE_MESSAGE);
        };

        if !is_executable(path) {
            tracing::warn!(path = %path.display(), "analyzer binary missing or not executable");
            return degraded(UNAVAILABLE_MESSAGE);
        }

        let payload = match serde_json::to_string(request) {
            Ok(payload) => payload,
            Err(e) => return degraded(format!("Failed to encode analysis request: {e}")),
        };

        // kill_on_drop backstops every early return below: the child is
        // killed if it is still alive when the handle is dropped, and
        // killing an already-dead child is a no-op.
        let mut child = match Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to spawn analyzer");
                return degraded(format!("{UNAVAILABLE_MESSAGE}: {e}"));
            }
        };

        // Write the request and close stdin so the child sees EOF. A write
        // error here usually means the child exited without reading; its
        // exit status will tell the real story, so the error is not fatal.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(payload.as_bytes()).await {
                tracing::debug!(error = %e, "analyzer did not read its stdin");
            }
        }

        // Accumulate both pipes concurrently while racing exit vs deadline;
        // a chatty analyzer must not block on a full pipe buffer.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_task = tokio::spawn(drain(stdout_pipe));
        let stderr_task = tokio::spawn(drain(stderr_pipe));

        let status = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => status,
                Err(e) => {
                    stdout_task.abort();
                    stderr_task.abort();
                    return degraded(format!("Failed to wait for analyzer: {e}"));
                }
            },
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                tracing::warn!(timeout = ?self.timeout, "analyzer exceeded deadline");
                return degraded(TIMEOUT_MESSAGE);
            }
        };

        let stdout_buf = stdout_task.await.unwrap_or_default();
        let stderr_buf = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let stderr_text = String::from_utf8_lossy(&stderr_buf);
            let detail = stderr_text.trim();
            let message = if detail.is_empty() {
                format!("Analysis process exited with {status}")
            } else {
                format!("Analysis process failed: {detail}")
            };
            tracing::warn!(%status, "analyzer exited with failure");
            return degraded(message);
        }

        let stdout_text = String::from_utf8_lossy(&stdout_buf);
        match parse_report(&stdout_text) {
            Ok(report) => AnalysisOutcome::Success(report),
            Err(detail) => degraded(format!("Failed to parse analysis response: {detail}")),
        }
    }
}

impl Default for AnalyzerBridge {
    fn default() -> Self {
        Self::unavailable()
    }
}

fn degraded(message: impl Into<String>) -> AnalysisOutcome {
    AnalysisOutcome::Degraded(Diagnostic::error(message, BRIDGE_SOURCE))
}

async fn drain(pipe: Option<impl AsyncRead + Unpin>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Scans analyzer stdout for the report.
///
/// The first line that parses as a JSON object is the candidate; it must
/// carry `diagnostics: array`, `suggestions: array` and
/// `explanation: string` or the whole run is a parse failure.
fn parse_report(stdout: &str) -> Result<AnalysisReport, String> {
    for line in stdout.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
            continue;
        };
        if !value.is_object() {
            continue;
        }
        return validate_report(value);
    }
    Err("no JSON object found on stdout".to_string())
}

fn validate_report(value: Value) -> Result<AnalysisReport, String> {
    require_field(&value, "diagnostics", Value::is_array, "array")?;
    require_field(&value, "suggestions", Value::is_array, "array")?;
    require_field(&value, "explanation", Value::is_string, "string")?;

    serde_json::from_value(value).map_err(|e| format!("malformed report: {e}"))
}

fn require_field(
    value: &Value,
    name: &str,
    check: impl Fn(&Value) -> bool,
    expected: &str,
) -> Result<(), String> {
    match value.get(name) {
        None => Err(format!("missing field '{name}'")),
        Some(field) if !check(field) => Err(format!("field '{name}' must have type {expected}")),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            code: "fn main() {}".to_string(),
            file_name: Some("main.rs".to_string()),
        }
    }

    #[tokio::test]
    async fn no_binary_degrades_with_unavailable_message() {
        let bridge = AnalyzerBridge::unavailable();
        let outcome = bridge.analyze(&request()).await;
        let AnalysisOutcome::Degraded(diag) = outcome else {
            panic!("expected degraded outcome");
        };
        assert!(diag.message.contains("service is unavailable"));
        assert_eq!(diag.source.as_deref(), Some(BRIDGE_SOURCE));
    }

    #[tokio::test]
    async fn missing_binary_file_degrades() {
        let bridge = AnalyzerBridge::new(
            Some(PathBuf::from("/nonexistent/analyzer-binary")),
            DEFAULT_TIMEOUT,
        );
        let outcome = bridge.analyze(&request()).await;
        assert!(outcome.is_degraded());
    }

    #[test]
    fn parse_report_skips_leading_noise() {
        let stdout = "starting analyzer...\nloaded 3 lints\n{\"diagnostics\":[],\"suggestions\":[],\"explanation\":\"ok\"}\n";
        let report = parse_report(stdout).unwrap();
        assert_eq!(report.explanation, "ok");
    }

    #[test]
    fn parse_report_rejects_pure_noise() {
        let err = parse_report("warming up\nno json here\n").unwrap_err();
        assert!(err.contains("no JSON object"));
    }

    #[test]
    fn parse_report_rejects_missing_fields() {
        let err = parse_report("{\"diagnostics\":[]}").unwrap_err();
        assert!(err.contains("suggestions"));
    }

    #[test]
    fn parse_report_rejects_mistyped_fields() {
        let err =
            parse_report("{\"diagnostics\":{},\"suggestions\":[],\"explanation\":\"x\"}").unwrap_err();
        assert!(err.contains("diagnostics"));
    }

    #[test]
    fn parse_report_first_object_decides() {
        // The first complete JSON object is the candidate even when a
        // well-formed report follows it.
        let stdout = "{\"diagnostics\":[]}\n{\"diagnostics\":[],\"suggestions\":[],\"explanation\":\"ok\"}\n";
        assert!(parse_report(stdout).is_err());
    }

    #[test]
    fn parse_report_skips_invalid_json_lines() {
        let stdout = "{not json\n{\"diagnostics\":[],\"suggestions\":[],\"explanation\":\"ok\"}\n";
        let report = parse_report(stdout).unwrap();
        assert_eq!(report.explanation, "ok");
    }

    #[test]
    fn degraded_outcome_flattens_to_report() {
        let (report, degraded) = AnalysisOutcome::Degraded(Diagnostic::error(
            "Analysis timed out",
            BRIDGE_SOURCE,
        ))
        .into_report();
        assert!(degraded);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.explanation, "Analysis timed out");
        assert!(report.suggestions.is_empty());
    }
}
