//! Regex-based local code checks.
//!
//! These checks run entirely in-process and back the `rust.suggest` and
//! `rust.explain` tools. They also enrich `rust.analyze` results so the
//! server stays useful when the external analyzer is not installed.
//!
//! The checks are line-oriented and intentionally shallow. Anything that
//! needs real type or flow information belongs in the external analyzer.

use std::sync::OnceLock;

use regex::Regex;

use super::{AnalysisReport, AnalysisRequest, Diagnostic, Position, Range, Severity, Suggestion};

/// Component tag recorded in `Diagnostic::source` for local findings.
pub const HEURISTIC_SOURCE: &str = "heuristic";

struct Check {
    pattern: &'static Regex,
    severity: Severity,
    message: &'static str,
    code: Option<&'static str>,
    suggestion: Option<(&'static str, &'static str)>,
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("heuristic pattern must compile"))
}

fn checks() -> Vec<Check> {
    static UNWRAP: OnceLock<Regex> = OnceLock::new();
    static EXPECT: OnceLock<Regex> = OnceLock::new();
    static STR_AS_NUM: OnceLock<Regex> = OnceLock::new();
    static DEBUG_PRINT: OnceLock<Regex> = OnceLock::new();
    static UNFINISHED: OnceLock<Regex> = OnceLock::new();

    vec![
        Check {
            pattern: regex(&UNWRAP, r"\.unwrap\(\)"),
            severity: Severity::Warning,
            message: "`unwrap()` panics when the value is `Err` or `None`",
            code: None,
            suggestion: Some((
                "Propagate the error instead of unwrapping",
                "let value = fallible()?;",
            )),
        },
        Check {
            pattern: regex(&EXPECT, r"\.expect\("),
            severity: Severity::Hint,
            message: "`expect()` panics when the value is `Err` or `None`",
            code: None,
            suggestion: None,
        },
        Check {
            pattern: regex(
                &STR_AS_NUM,
                r#"let\s+(?:mut\s+)?\w+\s*:\s*(?:[iu](?:8|16|32|64|128|size)|f32|f64)\s*=\s*""#,
            ),
            severity: Severity::Error,
            message: "mismatched types: string literal assigned to a numeric binding",
            code: Some("E0308"),
            suggestion: Some((
                "Parse the string into the numeric type",
                "let value: i32 = \"42\".parse()?;",
            )),
        },
        Check {
            pattern: regex(&DEBUG_PRINT, r"(?:println!|eprintln!|dbg!)\s*\("),
            severity: Severity::Hint,
            message: "debug output left in code",
            code: None,
            suggestion: Some((
                "Use structured logging instead of print statements",
                "tracing::debug!(?value, \"checkpoint\");",
            )),
        },
        Check {
            pattern: regex(&UNFINISHED, r"(?:todo!|unimplemented!)\s*\("),
            severity: Severity::Warning,
            message: "unfinished code path will panic if reached",
            code: None,
            suggestion: None,
        },
    ]
}

#[allow(clippy::cast_possible_truncation)] // source lines longer than u32::MAX are not real inputs
fn range_for(line_idx: usize, start: usize, end: usize) -> Range {
    Range {
        start: Position {
            line: line_idx as u32,
            character: start as u32,
        },
        end: Position {
            line: line_idx as u32,
            character: end as u32,
        },
    }
}

/// Runs every heuristic check over the submitted code.
///
/// Always succeeds; an empty report means no check fired.
#[must_use]
pub fn analyze(request: &AnalysisRequest) -> AnalysisReport {
    let mut report = AnalysisReport::empty(String::new());
    let checks = checks();

    for (line_idx, line) in request.code.lines().enumerate() {
        // Skip comment lines so examples in doc comments don't trip checks.
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") {
            continue;
        }

        for check in &checks {
            if let Some(m) = check.pattern.find(line) {
                let range = range_for(line_idx, m.start(), m.end());
                report.diagnostics.push(Diagnostic {
                    message: check.message.to_string(),
                    severity: check.severity,
                    range: Some(range),
                    code: check.code.map(str::to_string),
                    source: Some(HEURISTIC_SOURCE.to_string()),
                });
                if let Some((title, example)) = check.suggestion {
                    report.suggestions.push(Suggestion {
                        title: title.to_string(),
                        description: Some(check.message.to_string()),
                        code: example.to_string(),
                        range: Some(range),
                    });
                }
            }
        }
    }

    report.explanation = summarise(request, &report);
    report
}

/// Produces a prose explanation of the submitted code and any findings.
///
/// This is the whole of the `rust.explain` tool: a short structural
/// description plus one sentence per finding category.
#[must_use]
pub fn explain(request: &AnalysisRequest) -> AnalysisReport {
    let mut report = analyze(request);

    let fn_count = request
        .code
        .lines()
        .filter(|l| l.trim_start().starts_with("fn ") || l.contains(" fn "))
        .count();
    let line_count = request.code.lines().count();

    let name = request.file_name.as_deref().unwrap_or("the submitted code");
    let mut explanation = format!("{name} spans {line_count} lines and defines {fn_count} function(s).");
    if !report.explanation.is_empty() {
        explanation.push(' ');
        explanation.push_str(&report.explanation);
    }
    report.explanation = explanation;
    report
}

fn summarise(request: &AnalysisRequest, report: &AnalysisReport) -> String {
    let errors = report
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let total = report.diagnostics.len();
    let lines = request.code.lines().count();

    if total == 0 {
        format!("Heuristic scan found no issues across {lines} line(s).")
    } else {
        format!("Heuristic scan found {total} issue(s) ({errors} error(s)) across {lines} line(s).")
    }
}
