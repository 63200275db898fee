//! Response encoding.
//!
//! Pure functions from a captured [`ReplyContext`] and an outcome to one
//! outbound wire frame. No I/O, no state. The context alone decides the
//! response dialect; in particular a numeric request id is never coerced to
//! a string, and a null id comes back as null.

use serde_json::{json, Value};

use super::envelope::{
    ErrorObject, LegacyResponse, Outbound, ProtocolError, ReplyContext, RpcErrorResponse,
    RpcResponse, PROTOCOL_VERSION,
};

/// Type tag used for legacy-shape error responses.
const LEGACY_ERROR_TYPE: &str = "error";

/// Encodes a successful outcome in the dialect of the triggering request.
///
/// RPC-shape: `{"version":"2.0","id":<echoed>,"result":<result>}`.
/// Legacy-shape: `{"type":<echoed request type>,"data":<result>}`.
#[must_use]
pub fn encode_result(ctx: &ReplyContext, result: Value) -> Outbound {
    match ctx {
        ReplyContext::Rpc { id } => Outbound::RpcResult(RpcResponse {
            version: PROTOCOL_VERSION,
            id: id.clone(),
            result,
        }),
        ReplyContext::Legacy { message_type } => Outbound::Legacy(LegacyResponse {
            message_type: message_type.clone(),
            data: result,
        }),
    }
}

/// Encodes a protocol error in the dialect of the triggering request.
///
/// RPC-shape: `{"version":"2.0","id":<echoed>,"error":{"code":...,"message":...}}`.
/// Legacy-shape: `{"type":"error","data":{"message":...}}` — the legacy
/// dialect has no error codes, so only the message crosses the wire.
#[must_use]
pub fn encode_error(ctx: &ReplyContext, error: &ProtocolError) -> Outbound {
    match ctx {
        ReplyContext::Rpc { id } => Outbound::RpcError(RpcErrorResponse {
            version: PROTOCOL_VERSION,
            id: id.clone(),
            error: ErrorObject {
                code: error.code.code(),
                message: error.message.clone(),
            },
        }),
        ReplyContext::Legacy { .. } => Outbound::Legacy(LegacyResponse {
            message_type: LEGACY_ERROR_TYPE.to_string(),
            data: json!({ "message": error.message }),
        }),
    }
}
