//! Structural schema inference.
//!
//! Used as the fallback when a node carries no explicit response schema: the
//! capability is shown a schema derived from the agent's own attributes so it
//! answers with keys of the same shape.

use serde_json::{json, Map, Value};

/// The JSON Schema dialect written into inferred schemas.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Infer a JSON Schema describing the structure of `sample`.
///
/// - Objects list every key under `properties`, typed recursively. No key is
///   `required`: change sets are partial by nature.
/// - Arrays are typed by their first element; an empty array accepts any items.
/// - Integers and other numbers are distinguished.
pub fn infer_schema(sample: &Value) -> Value {
    let mut schema = infer_node(sample);
    if let Value::Object(map) = &mut schema {
        map.insert("$schema".to_string(), json!(SCHEMA_DIALECT));
    }
    schema
}

fn infer_node(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "type": "null" }),
        Value::Bool(_) => json!({ "type": "boolean" }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "type": "integer" }),
        Value::Number(_) => json!({ "type": "number" }),
        Value::String(_) => json!({ "type": "string" }),
        Value::Array(items) => match items.first() {
            Some(first) => json!({ "type": "array", "items": infer_node(first) }),
            None => json!({ "type": "array" }),
        },
        Value::Object(fields) => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|(key, v)| (key.clone(), infer_node(v)))
                .collect();
            json!({ "type": "object", "properties": properties })
        }
    }
}
