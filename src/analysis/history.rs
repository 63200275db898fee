//! Bounded in-memory history of analysis runs.
//!
//! Backs the `rust.history` tool. Entries live only for the lifetime of the
//! process; nothing is written to disk.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AnalysisReport;

/// Default number of entries retained.
pub const DEFAULT_CAPACITY: usize = 100;

/// One recorded analysis run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Which tool produced the entry.
    pub tool: String,
    /// Logical file name, when the client supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Number of diagnostics in the report.
    pub diagnostic_count: usize,
    /// Number of suggestions in the report.
    pub suggestion_count: usize,
    /// Whether the run fell back to a degraded outcome.
    pub degraded: bool,
    /// When the run completed.
    pub recorded_at: DateTime<Utc>,
}

/// Fixed-capacity store of recent [`HistoryEntry`] values, newest last.
///
/// The mutex is only ever held for a push or a copy, never across an await
/// point, so it cannot deadlock the cooperative scheduler.
#[derive(Debug)]
pub struct HistoryStore {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl HistoryStore {
    /// Creates a store retaining at most `capacity` entries.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Records the outcome of one analysis run.
    pub fn record(
        &self,
        tool: &str,
        file_name: Option<&str>,
        report: &AnalysisReport,
        degraded: bool,
    ) {
        let entry = HistoryEntry {
            tool: tool.to_string(),
            file_name: file_name.map(str::to_string),
            diagnostic_count: report.diagnostics.len(),
            suggestion_count: report.suggestions.len(),
            degraded,
            recorded_at: Utc::now(),
        };

        let mut entries = self.entries.lock().expect("history mutex poisoned");
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Returns up to `limit` entries, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().expect("history mutex poisoned");
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("history mutex poisoned").len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(diagnostics: usize) -> AnalysisReport {
        let mut report = AnalysisReport::empty("test");
        for i in 0..diagnostics {
            report
                .diagnostics
                .push(crate::analysis::Diagnostic::error(format!("d{i}"), "test"));
        }
        report
    }

    #[test]
    fn record_and_recall_newest_first() {
        let store = HistoryStore::new(10);
        store.record("rust.analyze", Some("a.rs"), &report_with(1), false);
        store.record("rust.analyze", Some("b.rs"), &report_with(2), true);

        let recent = store.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].file_name.as_deref(), Some("b.rs"));
        assert!(recent[0].degraded);
        assert_eq!(recent[1].diagnostic_count, 1);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = HistoryStore::new(2);
        store.record("rust.analyze", Some("a.rs"), &report_with(0), false);
        store.record("rust.analyze", Some("b.rs"), &report_with(0), false);
        store.record("rust.analyze", Some("c.rs"), &report_with(0), false);

        let recent = store.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].file_name.as_deref(), Some("c.rs"));
        assert_eq!(recent[1].file_name.as_deref(), Some("b.rs"));
    }

    #[test]
    fn limit_truncates_results() {
        let store = HistoryStore::default();
        for i in 0..5 {
            let name = format!("{i}.rs");
            store.record("rust.suggest", Some(name.as_str()), &report_with(0), false);
        }
        assert_eq!(store.recent(3).len(), 3);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn entry_serialises_camel_case() {
        let store = HistoryStore::default();
        store.record("rust.analyze", Some("a.rs"), &report_with(1), false);
        let json = serde_json::to_string(&store.recent(1)[0]).unwrap();
        assert!(json.contains(r#""fileName":"a.rs""#));
        assert!(json.contains(r#""diagnosticCount":1"#));
        assert!(json.contains("recordedAt"));
    }
}
