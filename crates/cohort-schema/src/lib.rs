//! # cohort-schema
//!
//! Response schema support for the cohort engine.
//!
//! Two jobs:
//!
//! 1. **Inference**: [`infer_schema`] derives a JSON Schema from a sample
//!    value. Capabilities use it to implement `create_schema` when a node has
//!    no explicit schema.
//! 2. **Checking**: [`check`] validates a parsed reply against an explicit
//!    schema using the `jsonschema` crate.
//!
//! ```rust,ignore
//! use cohort_schema::{check, infer_schema};
//!
//! let schema = infer_schema(&serde_json::json!({ "height": 160 }));
//! assert!(check(&serde_json::json!({ "height": 171 }), &schema).is_empty());
//! ```

pub mod check;
pub mod infer;

pub use check::{check, describe, SchemaViolation};
pub use infer::{infer_schema, SCHEMA_DIALECT};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{check, describe, infer_schema};

    // ── Inference ─────────────────────────────────────────────────────────────

    #[test]
    fn test_infers_scalar_types() {
        let schema = infer_schema(&json!({
            "name": "Ada",
            "age": 36,
            "height": 165.5,
            "alive": true,
            "nickname": null
        }));

        let props = &schema["properties"];
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(props["name"]["type"], json!("string"));
        assert_eq!(props["age"]["type"], json!("integer"));
        assert_eq!(props["height"]["type"], json!("number"));
        assert_eq!(props["alive"]["type"], json!("boolean"));
        assert_eq!(props["nickname"]["type"], json!("null"));
        assert!(schema.get("required").is_none(), "change sets are partial");
    }

    #[test]
    fn test_infers_nested_objects_and_arrays() {
        let schema = infer_schema(&json!({
            "address": { "city": "Lyon" },
            "tags": ["a", "b"],
            "empty": []
        }));

        let props = &schema["properties"];
        assert_eq!(props["address"]["properties"]["city"]["type"], json!("string"));
        assert_eq!(props["tags"]["items"]["type"], json!("string"));
        assert!(props["empty"].get("items").is_none());
        assert_eq!(schema["$schema"], json!(super::SCHEMA_DIALECT));
    }

    // ── Checking ──────────────────────────────────────────────────────────────

    #[test]
    fn test_inferred_schema_accepts_partial_change_sets() {
        let schema = infer_schema(&json!({ "height": 160, "name": "B" }));
        assert!(check(&json!({ "height": 171 }), &schema).is_empty());
    }

    #[test]
    fn test_reports_type_mismatch_with_path() {
        let schema = json!({
            "type": "object",
            "properties": { "height": { "type": "integer" } }
        });

        let violations = check(&json!({ "height": "tall" }), &schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].instance_path, "/height");

        let lines = describe(&violations);
        assert!(lines[0].starts_with("at /height:"), "got {}", lines[0]);
    }

    #[test]
    fn test_collects_every_violation() {
        let schema = json!({
            "type": "object",
            "required": ["mood", "energy"],
            "properties": { "energy": { "type": "number" } }
        });

        let violations = check(&json!({ "energy": "low" }), &schema);
        assert_eq!(violations.len(), 2, "missing 'mood' and mistyped 'energy'");
    }

    #[test]
    fn test_null_schema_is_unconstrained() {
        assert!(check(&json!({ "anything": [1, 2] }), &serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_invalid_schema_becomes_single_violation() {
        let violations = check(&json!({}), &json!({ "type": 42 }));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("invalid JSON Schema document"));
        assert_eq!(describe(&violations)[0].split(':').next(), Some("at /"));
    }
}
