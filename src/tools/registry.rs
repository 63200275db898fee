//! Tool and resource registries.
//!
//! Both registries are built once at startup, passed into the dispatcher by
//! reference, and never mutated afterwards — there is no ambient singleton
//! and no locking. Lookup is O(1); iteration preserves registration order
//! so `tools/list` output is stable.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::ToolError;

/// The future a tool handler returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;

/// The uniform invocation contract: validated params in, result out.
pub type ToolHandler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// One registered tool.
pub struct ToolDescriptor {
    /// Unique tool name (also the legacy message type).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Structural schema the dispatcher validates params against.
    pub input_schema: Value,
    handler: ToolHandler,
}

impl ToolDescriptor {
    /// Creates a new tool descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler,
        }
    }

    /// Invokes the handler with already-validated params.
    pub fn invoke(&self, params: Value) -> HandlerFuture {
        (self.handler)(params)
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Serialisable tool summary for `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Read-only table of tools, keyed by name.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. Initialisation only; replacing an existing name is
    /// a programming error.
    pub fn register(&mut self, tool: ToolDescriptor) {
        let previous = self.tools.insert(tool.name.clone(), tool);
        debug_assert!(previous.is_none(), "duplicate tool registration");
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Returns serialisable definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.input_schema.clone(),
            })
            .collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry holds no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// One registered resource: a named, static blob of reference data.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDescriptor {
    /// Unique resource name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The resource content, served inline by `resources/list`.
    pub data: Value,
}

/// Read-only table of resources, keyed by name.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: IndexMap<String, ResourceDescriptor>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource. Initialisation only.
    pub fn register(&mut self, resource: ResourceDescriptor) {
        let previous = self.resources.insert(resource.name.clone(), resource);
        debug_assert!(previous.is_none(), "duplicate resource registration");
    }

    /// Looks up a resource by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(name)
    }

    /// Returns all resources in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ResourceDescriptor> {
        self.resources.values().cloned().collect()
    }

    /// Number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the registry holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_tool(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(
            name,
            "echoes its params",
            json!({"type": "object"}),
            Arc::new(|params: Value| Box::pin(async move { Ok(params) })),
        )
    }

    #[tokio::test]
    async fn register_and_invoke() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo"));

        let tool = registry.get("echo").expect("registered tool");
        let result = tool.invoke(json!({"hello": "world"})).await.unwrap();
        assert_eq!(result["hello"], "world");
    }

    #[test]
    fn unknown_name_returns_none() {
        let registry = ToolRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn definitions_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("zeta"));
        registry.register(echo_tool("alpha"));
        registry.register(echo_tool("mid"));

        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn definitions_serialise_camel_case_schema_key() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo"));
        let json = serde_json::to_string(&registry.definitions()).unwrap();
        assert!(json.contains(r#""inputSchema""#));
    }

    #[test]
    fn resource_registry_round_trip() {
        let mut registry = ResourceRegistry::new();
        registry.register(ResourceDescriptor {
            name: "rust.common-errors".to_string(),
            description: "Common compiler errors".to_string(),
            data: json!({"E0308": "mismatched types"}),
        });

        assert_eq!(registry.len(), 1);
        let resource = registry.get("rust.common-errors").expect("resource");
        assert_eq!(resource.data["E0308"], "mismatched types");
    }
}
