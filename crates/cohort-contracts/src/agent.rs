//! Agent identity, attribute, and history types.
//!
//! An agent is a bag of attributes plus the append-only record of every
//! change set that was merged into it. The engine never deletes an agent
//! during a run and never rewrites a history entry.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::process::{NodeId, ProcessId};

/// Schema-agnostic attribute set: string keys mapped to JSON values.
pub type Attributes = Map<String, Value>;

/// Stable, opaque identifier for an agent.
///
/// Ordered so that stores and ledgers iterate agents deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One immutable record of a change set applied to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Wall-clock time the change was merged (UTC).
    pub timestamp: DateTime<Utc>,
    /// The node whose capability call produced the change.
    pub node_id: NodeId,
    /// The process the node ran under, when it ran inside one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<ProcessId>,
    /// The change set exactly as it was merged.
    pub changes: Attributes,
    /// Reasoning text returned alongside the change, when it was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A single simulated agent.
///
/// `attributes` always equals `initial_attributes` with every history entry's
/// change set merged over it in order. [`Agent::replay`] recomputes that value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Attributes as registered, before any node ran.
    pub initial_attributes: Attributes,
    /// Current attributes.
    pub attributes: Attributes,
    /// Append-only history, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            initial_attributes: attributes.clone(),
            attributes,
            history: Vec::new(),
        }
    }

    /// Merge `changes` into the attribute set and append one history entry.
    ///
    /// Keys present in `changes` overwrite existing values; keys absent from
    /// it are left untouched.
    pub fn apply_changes(
        &mut self,
        node_id: NodeId,
        process_id: Option<ProcessId>,
        changes: Attributes,
        reasoning: Option<String>,
    ) {
        merge_into(&mut self.attributes, &changes);
        self.history.push(HistoryEntry {
            timestamp: Utc::now(),
            node_id,
            process_id,
            changes,
            reasoning,
        });
    }

    /// Rebuild the attribute set from `initial_attributes` and the history.
    pub fn replay(&self) -> Attributes {
        let mut attributes = self.initial_attributes.clone();
        for entry in &self.history {
            merge_into(&mut attributes, &entry.changes);
        }
        attributes
    }

    /// Shorthand for reading one attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

fn merge_into(target: &mut Attributes, changes: &Attributes) {
    for (key, value) in changes {
        target.insert(key.clone(), value.clone());
    }
}
