//! Integration tests for envelope decoding and encoding.
//!
//! These tests verify the dialect classification and the id round-trip
//! property: for every valid request shape, the encoded response carries
//! the request's id with its JSON type intact.

use rust_coach_mcp::protocol::envelope::{decode, ErrorCode, Inbound, RequestId};
use rust_coach_mcp::protocol::{encoder, ReplyContext};
use serde_json::{json, Value};

// =============================================================================
// Dialect Classification Tests
// =============================================================================

#[test]
fn test_classify_rpc_request() {
    let json = r#"{
        "version": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {}
    }"#;

    let msg = decode(json).unwrap();
    let Inbound::Rpc(req) = msg else {
        panic!("Expected RPC-shape");
    };
    assert_eq!(req.id, Some(RequestId::Number(1)));
    assert_eq!(req.method, "initialize");
}

#[test]
fn test_classify_legacy_request() {
    let json = r#"{
        "type": "rust.analyze",
        "data": { "code": "fn main() {}" }
    }"#;

    let msg = decode(json).unwrap();
    let Inbound::Legacy(req) = msg else {
        panic!("Expected legacy-shape");
    };
    assert_eq!(req.message_type, "rust.analyze");
}

#[test]
fn test_both_dialects_on_one_stream() {
    // The classifier is per-message; nothing about one message constrains
    // the next.
    assert!(matches!(
        decode(r#"{"version":"2.0","id":1,"method":"ping"}"#).unwrap(),
        Inbound::Rpc(_)
    ));
    assert!(matches!(
        decode(r#"{"type":"rust.analyze","data":{}}"#).unwrap(),
        Inbound::Legacy(_)
    ));
    assert!(matches!(
        decode(r#"{"version":"2.0","id":2,"method":"ping"}"#).unwrap(),
        Inbound::Rpc(_)
    ));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let err = decode("not valid json").unwrap_err();
    assert_eq!(err.code, ErrorCode::ParseError);
}

#[test]
fn test_missing_version_with_method_is_not_rpc() {
    let err = decode(r#"{"id": 1, "method": "test"}"#).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidRequest);
}

// =============================================================================
// Id Round-Trip Property
// =============================================================================

fn response_id_for(request: &str) -> Value {
    let Inbound::Rpc(req) = decode(request).unwrap() else {
        panic!("expected RPC-shape request");
    };
    let ctx = ReplyContext::Rpc { id: req.id };
    let line = encoder::encode_result(&ctx, json!({"ok": true}))
        .to_line()
        .unwrap();
    let value: Value = serde_json::from_str(&line).unwrap();
    value["id"].clone()
}

#[test]
fn test_numeric_id_round_trips_as_number() {
    let id = response_id_for(r#"{"version":"2.0","id":42,"method":"ping"}"#);
    assert_eq!(id, json!(42));
}

#[test]
fn test_string_id_round_trips_as_string() {
    let id = response_id_for(r#"{"version":"2.0","id":"42","method":"ping"}"#);
    assert_eq!(id, json!("42"));
}

#[test]
fn test_null_id_round_trips_as_null() {
    let id = response_id_for(r#"{"version":"2.0","id":null,"method":"ping"}"#);
    assert_eq!(id, Value::Null);
}

#[test]
fn test_error_response_keeps_id_type() {
    let Inbound::Rpc(req) =
        decode(r#"{"version":"2.0","id":"req-9","method":"nope"}"#).unwrap()
    else {
        panic!("expected RPC-shape request");
    };
    let ctx = ReplyContext::Rpc { id: req.id };
    let error = rust_coach_mcp::protocol::ProtocolError::new(
        ErrorCode::MethodNotFound,
        "Method not found: nope",
    );
    let line = encoder::encode_error(&ctx, &error).to_line().unwrap();
    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["id"], json!("req-9"));
    assert_eq!(value["error"]["code"], json!(-32601));
}

#[test]
fn test_legacy_response_echoes_type() {
    let Inbound::Legacy(req) = decode(r#"{"type":"rust.suggest","data":{}}"#).unwrap() else {
        panic!("expected legacy-shape request");
    };
    let ctx = ReplyContext::Legacy {
        message_type: req.message_type,
    };
    let line = encoder::encode_result(&ctx, json!({"suggestions": []}))
        .to_line()
        .unwrap();
    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["type"], json!("rust.suggest"));
}
