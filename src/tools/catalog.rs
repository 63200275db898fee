//! Built-in tool and resource tables.
//!
//! The four `rust.*` tools are the server's whole surface. Their handlers
//! close over the shared [`AnalyzerBridge`] and [`HistoryStore`]; the
//! dispatcher sees only the uniform `params -> result` contract.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::analysis::history::HistoryStore;
use crate::analysis::{heuristics, AnalysisRequest};
use crate::bridge::AnalyzerBridge;
use crate::error::ToolError;

use super::registry::{ResourceDescriptor, ResourceRegistry, ToolDescriptor, ToolRegistry};

/// Default number of history entries returned when the client gives no limit.
const DEFAULT_HISTORY_LIMIT: usize = 20;

fn code_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "Rust source code to analyse"
            },
            "fileName": {
                "type": "string",
                "description": "Logical file name used in diagnostics"
            }
        },
        "required": ["code"]
    })
}

fn parse_request(params: Value) -> Result<AnalysisRequest, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

fn report_value(report: &crate::analysis::AnalysisReport) -> Result<Value, ToolError> {
    serde_json::to_value(report).map_err(|e| ToolError::Execution(e.to_string()))
}

/// Builds the default tool registry.
#[must_use]
pub fn build_tool_registry(bridge: Arc<AnalyzerBridge>, history: Arc<HistoryStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    {
        let bridge = Arc::clone(&bridge);
        let history = Arc::clone(&history);
        registry.register(ToolDescriptor::new(
            "rust.analyze",
            "Analyse Rust code for errors and warnings using the external \
             analyzer, falling back to local heuristic checks",
            code_input_schema(),
            Arc::new(move |params: Value| {
                let bridge = Arc::clone(&bridge);
                let history = Arc::clone(&history);
                Box::pin(async move {
                    let request = parse_request(params)?;
                    let (mut report, degraded) = bridge.analyze(&request).await.into_report();
                    report.merge(heuristics::analyze(&request));
                    history.record(
                        "rust.analyze",
                        request.file_name.as_deref(),
                        &report,
                        degraded,
                    );
                    report_value(&report)
                })
            }),
        ));
    }

    {
        let history = Arc::clone(&history);
        registry.register(ToolDescriptor::new(
            "rust.suggest",
            "Suggest improvements to Rust code based on local heuristic checks",
            code_input_schema(),
            Arc::new(move |params: Value| {
                let history = Arc::clone(&history);
                Box::pin(async move {
                    let request = parse_request(params)?;
                    let report = heuristics::analyze(&request);
                    history.record(
                        "rust.suggest",
                        request.file_name.as_deref(),
                        &report,
                        false,
                    );
                    report_value(&report)
                })
            }),
        ));
    }

    {
        let history = Arc::clone(&history);
        registry.register(ToolDescriptor::new(
            "rust.explain",
            "Explain what a piece of Rust code does and why its findings matter",
            code_input_schema(),
            Arc::new(move |params: Value| {
                let history = Arc::clone(&history);
                Box::pin(async move {
                    let request = parse_request(params)?;
                    let report = heuristics::explain(&request);
                    history.record(
                        "rust.explain",
                        request.file_name.as_deref(),
                        &report,
                        false,
                    );
                    report_value(&report)
                })
            }),
        ));
    }

    {
        let history = Arc::clone(&history);
        registry.register(ToolDescriptor::new(
            "rust.history",
            "List recent analysis runs, newest first",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of entries to return"
                    }
                }
            }),
            Arc::new(move |params: Value| {
                let history = Arc::clone(&history);
                Box::pin(async move {
                    #[derive(Deserialize)]
                    struct HistoryParams {
                        #[serde(default)]
                        limit: Option<usize>,
                    }

                    let params: HistoryParams = serde_json::from_value(params)
                        .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
                    let entries = history.recent(params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
                    Ok(json!({ "count": entries.len(), "entries": entries }))
                })
            }),
        ));
    }

    registry
}

/// Builds the static resource table.
#[must_use]
pub fn build_resource_registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();

    registry.register(ResourceDescriptor {
        name: "rust.common-errors".to_string(),
        description: "Explanations of frequently-hit rustc error codes".to_string(),
        data: json!({
            "E0308": "mismatched types: the expression's type differs from the expected type",
            "E0382": "borrow of moved value: the value was moved and then used again",
            "E0499": "cannot borrow as mutable more than once at a time",
            "E0502": "cannot borrow as mutable because it is also borrowed as immutable",
            "E0599": "no method found for the receiver type; check the trait is in scope"
        }),
    });

    registry.register(ResourceDescriptor {
        name: "rust.review-checklist".to_string(),
        description: "Checklist applied by the heuristic review pass".to_string(),
        data: json!([
            "Errors are propagated with `?` instead of unwrap/expect",
            "No debug print statements left in committed code",
            "Numeric bindings are not initialised from string literals",
            "No todo!/unimplemented! on reachable paths"
        ]),
    });

    registry
}
