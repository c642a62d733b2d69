//! JSON Schema checking of parsed replies.
//!
//! Only explicit node schemas are enforced. A violation does not fail the run;
//! node execution turns the violation list into an error-marker change set.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A single structural violation found in a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// JSON pointer of the offending value inside the payload ("" for the root).
    pub instance_path: String,
    /// Human-readable explanation.
    pub message: String,
}

/// Validate `payload` against `schema` and collect every violation.
///
/// A `null` schema means "no constraint". A schema that does not compile is
/// reported as one violation at the root rather than as an error, so a bad
/// node definition shows up in agent history instead of aborting a step.
pub fn check(payload: &Value, schema: &Value) -> Vec<SchemaViolation> {
    if schema.is_null() {
        return Vec::new();
    }

    match jsonschema::validator_for(schema) {
        Ok(validator) => validator
            .iter_errors(payload)
            .map(|error| SchemaViolation {
                instance_path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect(),
        Err(e) => {
            let message = format!("invalid JSON Schema document: {e}");
            warn!(%message, "response schema compilation failure");
            vec![SchemaViolation {
                instance_path: String::new(),
                message,
            }]
        }
    }
}

/// Render violations as one line each, in the form `at <path>: <message>`.
pub fn describe(violations: &[SchemaViolation]) -> Vec<String> {
    violations
        .iter()
        .map(|v| {
            let path = if v.instance_path.is_empty() { "/" } else { v.instance_path.as_str() };
            format!("at {}: {}", path, v.message)
        })
        .collect()
}
