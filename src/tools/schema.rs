//! Structural validation of tool params against declared input schemas.
//!
//! Tool schemas in this crate are plain JSON values using a small subset of
//! JSON Schema: `type` on the root and on each property, `properties`, and
//! `required`. The validator covers exactly that subset — a schema keyword
//! it does not know is ignored rather than rejected, so descriptions and
//! examples can live in the schema for clients without affecting
//! validation.
//!
//! Validation runs in the dispatcher, before the handler is invoked; a
//! failure is surfaced as `InvalidParams` and the handler never sees the
//! params.

use serde_json::Value;

/// Checks `params` against `schema`.
///
/// # Errors
///
/// Returns a human-readable description of the first violation found.
pub fn validate(params: &Value, schema: &Value) -> Result<(), String> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        check_type(params, expected, "params")?;
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if params.get(name).is_none() {
                return Err(format!("missing required property '{name}'"));
            }
        }
    }

    for (name, prop_schema) in properties {
        let Some(value) = params.get(name) else {
            continue;
        };
        if let Some(expected) = prop_schema.get("type").and_then(Value::as_str) {
            check_type(value, expected, name)?;
        }
    }

    Ok(())
}

fn check_type(value: &Value, expected: &str, at: &str) -> Result<(), String> {
    let matches = match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        // Unknown type keyword: accept rather than reject.
        _ => true,
    };

    if matches {
        Ok(())
    } else {
        Err(format!("'{at}' must be of type {expected}"))
    }
}
