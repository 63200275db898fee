//! The protocol dispatcher.
//!
//! Consumes raw decoded lines from any transport and produces exactly one
//! response frame per request, in the dialect of the request. The pipeline
//! per message is: decode → classify → resolve → validate → invoke →
//! encode. The dispatcher itself is stateless across messages — all state
//! lives in the registries it borrows — so one instance is shared by every
//! session via `Arc` and each inbound frame can run on its own task.
//!
//! Failure isolation: a malformed message, an unknown method, or a failing
//! handler produces an error response for that one request and nothing
//! else. Bridge failures never even become protocol errors; they arrive
//! here as ordinary handler results (see [`crate::bridge`]).

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tools::registry::{ResourceRegistry, ToolDescriptor, ToolRegistry};
use crate::tools::schema;

use super::encoder::{encode_error, encode_result};
use super::envelope::{
    decode, ErrorCode, Inbound, LegacyRequest, Outbound, ProtocolError, ReplyContext, RpcRequest,
    PROTOCOL_VERSION, SERVER_NAME,
};

/// Routes decoded messages to built-in methods and registered tools.
pub struct Dispatcher {
    tools: Arc<ToolRegistry>,
    resources: Arc<ResourceRegistry>,
}

/// Params shape for `tools/call`.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Name of the tool to call.
    name: String,
    /// Params forwarded to the tool after validation.
    #[serde(default)]
    params: Value,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registries.
    #[must_use]
    pub const fn new(tools: Arc<ToolRegistry>, resources: Arc<ResourceRegistry>) -> Self {
        Self { tools, resources }
    }

    /// Handles one raw line and returns the response frame.
    ///
    /// Infallible by design: every failure mode maps to an error frame in
    /// the appropriate dialect (RPC-shape with a null id when the dialect
    /// could not be determined).
    pub async fn dispatch_line(&self, raw: &str) -> Outbound {
        match decode(raw) {
            Ok(Inbound::Rpc(request)) => self.dispatch_rpc(request).await,
            Ok(Inbound::Legacy(request)) => self.dispatch_legacy(request).await,
            Err(error) => {
                tracing::debug!(code = error.code.code(), "rejected undecodable message");
                encode_error(&ReplyContext::unidentified(), &error)
            }
        }
    }

    async fn dispatch_rpc(&self, request: RpcRequest) -> Outbound {
        let ctx = ReplyContext::Rpc {
            id: request.id.clone(),
        };
        tracing::debug!(method = %request.method, "dispatching RPC-shape request");

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize_result()),
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "resources/list" => Ok(json!({ "resources": self.resources.definitions() })),
            "tools/call" => self.call_tool(request.params).await,
            "ping" => Ok(json!({})),
            method => Err(ProtocolError::new(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            )),
        };

        match outcome {
            Ok(result) => encode_result(&ctx, result),
            Err(error) => {
                tracing::debug!(code = error.code.code(), detail = %error.message, "request failed");
                encode_error(&ctx, &error)
            }
        }
    }

    async fn dispatch_legacy(&self, request: LegacyRequest) -> Outbound {
        let ctx = ReplyContext::Legacy {
            message_type: request.message_type.clone(),
        };
        tracing::debug!(message_type = %request.message_type, "dispatching legacy-shape request");

        // Legacy types map 1:1 to tool names by convention.
        let outcome = match self.tools.get(&request.message_type) {
            Some(tool) => self.invoke(tool, ensure_object(request.data)).await,
            None => Err(ProtocolError::new(
                ErrorCode::MethodNotFound,
                format!("Unsupported message type: {}", request.message_type),
            )),
        };

        match outcome {
            Ok(result) => encode_result(&ctx, result),
            Err(error) => encode_error(&ctx, &error),
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let call: ToolCallParams = serde_json::from_value(params.unwrap_or_else(|| json!({})))
            .map_err(|e| {
                ProtocolError::new(ErrorCode::InvalidParams, format!("Invalid params: {e}"))
            })?;

        let Some(tool) = self.tools.get(&call.name) else {
            return Err(ProtocolError::new(
                ErrorCode::MethodNotFound,
                format!("Method not found: {}", call.name),
            ));
        };

        self.invoke(tool, ensure_object(call.params)).await
    }

    /// Validates params against the tool's schema, then invokes its
    /// handler. Validation failures never reach the handler.
    async fn invoke(&self, tool: &ToolDescriptor, params: Value) -> Result<Value, ProtocolError> {
        schema::validate(&params, &tool.input_schema).map_err(|detail| {
            ProtocolError::new(ErrorCode::InvalidParams, format!("Invalid params: {detail}"))
        })?;

        tool.invoke(params).await.map_err(|e| match e {
            ToolError::InvalidParams(detail) => ProtocolError::new(
                ErrorCode::InvalidParams,
                format!("Invalid params: {detail}"),
            ),
            ToolError::Execution(detail) => {
                tracing::error!(tool = %tool.name, %detail, "tool handler failed");
                ProtocolError::new(ErrorCode::InternalError, format!("Internal error: {detail}"))
            }
        })
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {
                "tools": !self.tools.is_empty(),
                "resources": !self.resources.is_empty(),
            },
        })
    }
}

/// Absent params arrive as JSON null; handlers and the validator expect an
/// object, so null is normalised to `{}` before validation.
fn ensure_object(value: Value) -> Value {
    if value.is_null() {
        json!({})
    } else {
        value
    }
}
