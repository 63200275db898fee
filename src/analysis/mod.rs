//! Code analysis domain types and local analysis support.
//!
//! The wire shapes in this module are shared by three parties:
//!
//! - the external analyzer process (which emits an [`AnalysisReport`] as a
//!   single JSON line on stdout),
//! - the heuristic checks in [`heuristics`] (the local fallback),
//! - the tool handlers, which serialise reports into tool call results.
//!
//! All shapes use camelCase field names on the wire.

pub mod heuristics;
pub mod history;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The code is wrong and will not compile or will misbehave.
    Error,
    /// The code compiles but is suspicious.
    Warning,
    /// Neutral informational finding.
    Information,
    /// A stylistic nudge.
    Hint,
}

/// A zero-based position in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column (UTF-8 byte offset within the line).
    pub character: u32,
}

/// A half-open range in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Start of the range (inclusive).
    pub start: Position,
    /// End of the range (exclusive).
    pub end: Position,
}

/// One diagnostic finding about the submitted code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Human-readable description of the finding.
    pub message: String,
    /// How severe the finding is.
    pub severity: Severity,
    /// Location of the finding, when one could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// Diagnostic code (e.g. a rustc error code), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Which component produced the finding (e.g. `"bridge"`, `"heuristic"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Diagnostic {
    /// Creates a plain error diagnostic with no location.
    #[must_use]
    pub fn error(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            range: None,
            code: None,
            source: Some(source.into()),
        }
    }
}

/// A suggested improvement to the submitted code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Short imperative title.
    pub title: String,
    /// Longer rationale, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement or example code.
    pub code: String,
    /// Location the suggestion applies to, when one could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// One analysis request, as submitted by a client and forwarded to the
/// external analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// The Rust source code to analyse.
    pub code: String,
    /// Logical file name for the code, used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// The complete result of one analysis run.
///
/// This is also the exact shape the external analyzer must print as a
/// single JSON line on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Findings about the code.
    pub diagnostics: Vec<Diagnostic>,
    /// Suggested improvements.
    pub suggestions: Vec<Suggestion>,
    /// Prose summary of the analysis.
    pub explanation: String,
}

impl AnalysisReport {
    /// Creates an empty report with the given explanation.
    #[must_use]
    pub fn empty(explanation: impl Into<String>) -> Self {
        Self {
            diagnostics: Vec::new(),
            suggestions: Vec::new(),
            explanation: explanation.into(),
        }
    }

    /// Appends every finding from `other` onto this report.
    pub fn merge(&mut self, other: Self) {
        self.diagnostics.extend(other.diagnostics);
        self.suggestions.extend(other.suggestions);
        if self.explanation.is_empty() {
            self.explanation = other.explanation;
        } else if !other.explanation.is_empty() {
            self.explanation.push(' ');
            self.explanation.push_str(&other.explanation);
        }
    }
}
