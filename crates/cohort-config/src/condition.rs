//! Serializable branch conditions.
//!
//! A `Condition` is a small predicate tree over agent attributes, expressed in
//! TOML with a `kind` tag:
//!
//! ```toml
//! [process.condition]
//! kind = "in_range"
//! path = "height"
//! min = 150
//! max = 200
//! ```
//!
//! Paths are dotted (`vitals.height`); numeric segments index into arrays.
//! A path that does not resolve makes every leaf condition false.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cohort_contracts::agent::Attributes;
use cohort_core::traits::Predicate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Numeric value within `[min, max]`. A missing bound is open.
    InRange {
        path: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Value equal to `value`. Numbers compare by magnitude, so `160` equals `160.0`.
    Equals { path: String, value: Value },
    /// Value is the boolean `true`.
    IsTrue { path: String },
    /// Value is present and not null.
    Exists { path: String },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn matches(&self, attributes: &Attributes) -> bool {
        match self {
            Condition::InRange { path, min, max } => resolve(attributes, path)
                .and_then(Value::as_f64)
                .is_some_and(|n| min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)),
            Condition::Equals { path, value } => {
                resolve(attributes, path).is_some_and(|found| values_equal(found, value))
            }
            Condition::IsTrue { path } => {
                matches!(resolve(attributes, path), Some(Value::Bool(true)))
            }
            Condition::Exists { path } => {
                resolve(attributes, path).is_some_and(|found| !found.is_null())
            }
            Condition::All { conditions } => conditions.iter().all(|c| c.matches(attributes)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.matches(attributes)),
            Condition::Not { condition } => !condition.matches(attributes),
        }
    }
}

impl Predicate for Condition {
    fn evaluate(&self, attributes: &Attributes) -> bool {
        self.matches(attributes)
    }
}

/// Walk a dotted path through nested objects and arrays.
fn resolve<'a>(attributes: &'a Attributes, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = attributes.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn values_equal(found: &Value, expected: &Value) -> bool {
    match (found.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => found == expected,
    }
}
