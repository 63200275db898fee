//! Wire envelope types for the two coexisting message dialects.
//!
//! Every inbound message is one JSON value in one of two shapes:
//!
//! - **RPC-shape**: `{"version":"2.0","id":...,"method":...,"params":{...}}`
//! - **Legacy-shape**: `{"type":...,"data":{...}}`
//!
//! Both dialects are accepted on every transport, interleaved freely. The
//! dialect is decided exactly once, at decode time, and captured in a
//! [`ReplyContext`] that travels with the request until the response is
//! encoded — the response shape is never inferred from the payload.
//!
//! # Request IDs
//!
//! RPC-shape ids may be numbers, strings, or null. The JSON type of an id
//! round-trips unchanged: a numeric id never comes back as a string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The RPC-shape envelope version this implementation speaks.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Server name advertised in the `initialize` response.
pub const SERVER_NAME: &str = "rust-coach-mcp";

/// An RPC-shape request id.
///
/// Ids may also be null on the wire; that case is modelled as
/// `Option<RequestId>` so null survives the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// An RPC-shape request message.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    /// Must be "2.0".
    pub version: String,

    /// Request identifier; echoed verbatim in the response.
    #[serde(default)]
    pub id: Option<RequestId>,

    /// The method to invoke.
    pub method: String,

    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A legacy-shape request message.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyRequest {
    /// Message type; maps 1:1 to a tool name.
    #[serde(rename = "type")]
    pub message_type: String,

    /// Message payload.
    #[serde(default)]
    pub data: Value,
}

/// A decoded inbound message, tagged with its dialect.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// RPC-shape request.
    Rpc(RpcRequest),
    /// Legacy-shape request.
    Legacy(LegacyRequest),
}

/// Everything the encoder needs to build a response in the dialect of the
/// triggering request: the dialect tag, plus the request id (RPC) or the
/// message type (legacy).
///
/// Captured at decode time; never reconstructed from the response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContext {
    /// Respond in the RPC shape, echoing this id.
    Rpc {
        /// The id of the triggering request (null ids are preserved).
        id: Option<RequestId>,
    },
    /// Respond in the legacy shape, echoing this message type on success.
    Legacy {
        /// The `type` of the triggering request.
        message_type: String,
    },
}

impl ReplyContext {
    /// Context for responses to messages whose id could not be determined
    /// (e.g. malformed JSON). Per JSON-RPC convention, these are RPC-shape
    /// with a null id.
    #[must_use]
    pub const fn unidentified() -> Self {
        Self::Rpc { id: None }
    }
}

/// Standard protocol error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON is valid but matches neither dialect.
    InvalidRequest,
    /// The method or tool does not exist.
    MethodNotFound,
    /// Params failed schema validation.
    InvalidParams,
    /// A handler failed unexpectedly.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }
}

/// A protocol-level failure, carried until the encoder renders it in the
/// dialect of the triggering request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    /// Error classification.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ProtocolError {
    /// Creates a new protocol error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The wire error object inside an RPC-shape error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorObject {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
}

/// An RPC-shape success response.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    /// Always "2.0".
    pub version: &'static str,
    /// The request id this response corresponds to (null is serialised).
    pub id: Option<RequestId>,
    /// The result of the method call.
    pub result: Value,
}

/// An RPC-shape error response.
#[derive(Debug, Clone, Serialize)]
pub struct RpcErrorResponse {
    /// Always "2.0".
    pub version: &'static str,
    /// The request id this response corresponds to (null is serialised).
    pub id: Option<RequestId>,
    /// The error details.
    pub error: ErrorObject,
}

/// A legacy-shape response (success or error).
#[derive(Debug, Clone, Serialize)]
pub struct LegacyResponse {
    /// The response type: the request's type on success, `"error"` on failure.
    #[serde(rename = "type")]
    pub message_type: String,
    /// The response payload.
    pub data: Value,
}

/// One outbound wire frame in either dialect.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    /// RPC-shape success.
    RpcResult(RpcResponse),
    /// RPC-shape error.
    RpcError(RpcErrorResponse),
    /// Legacy-shape success or error.
    Legacy(LegacyResponse),
}

impl Outbound {
    /// Serialises this frame to a single JSON line (without the newline).
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails, which only happens for
    /// payloads containing non-JSON-representable values.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Decodes one raw line into an [`Inbound`] message.
///
/// Decoding happens in two steps, matching the dispatcher's state machine:
/// parse the JSON, then classify the dialect. A parse failure maps to
/// `ParseError`; a value that matches neither dialect maps to
/// `InvalidRequest`.
///
/// # Errors
///
/// Returns a [`ProtocolError`] describing why the line was rejected.
pub fn decode(raw: &str) -> Result<Inbound, ProtocolError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ProtocolError::new(ErrorCode::ParseError, format!("Parse error: {e}")))?;

    classify(value)
}

/// Classifies one parsed JSON value into a dialect.
///
/// RPC-shape requires `version == "2.0"` and a string `method`; legacy
/// shape requires a string `type`. The check is structural only — unknown
/// methods and types are resolved later, so they produce dialect-correct
/// errors instead of `InvalidRequest`.
///
/// # Errors
///
/// Returns `InvalidRequest` if the value matches neither dialect.
pub fn classify(value: Value) -> Result<Inbound, ProtocolError> {
    let invalid = |detail: &str| {
        ProtocolError::new(ErrorCode::InvalidRequest, format!("Invalid request: {detail}"))
    };

    let (is_rpc, has_type) = match value.as_object() {
        Some(obj) => (
            obj.get("version").and_then(Value::as_str) == Some(PROTOCOL_VERSION)
                && obj.get("method").is_some(),
            obj.get("type").is_some(),
        ),
        None => return Err(invalid("expected a JSON object")),
    };

    if is_rpc {
        let request: RpcRequest = serde_json::from_value(value)
            .map_err(|e| invalid(&format!("malformed RPC-shape message: {e}")))?;
        return Ok(Inbound::Rpc(request));
    }

    if has_type {
        let request: LegacyRequest = serde_json::from_value(value)
            .map_err(|e| invalid(&format!("malformed legacy-shape message: {e}")))?;
        return Ok(Inbound::Legacy(request));
    }

    Err(invalid(
        "expected an RPC-shape (version/method) or legacy-shape (type) message",
    ))
}
