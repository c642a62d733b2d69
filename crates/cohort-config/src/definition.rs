//! Declarative configuration schema.
//!
//! A `CohortConfig` is deserialized from TOML. It holds the engine settings,
//! one process definition, and optionally the agents to run it over.
//!
//! Example:
//! ```toml
//! [engine]
//! max_concurrency = 4
//!
//! [process]
//! kind = "linear"
//! id = "survey"
//!
//! [[process.nodes]]
//! id = "ask-income"
//! capability = "oracle"
//! instructions = "Estimate the respondent's income bracket."
//!
//! [[agents]]
//! id = "respondent-1"
//! attributes = { age = 34 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cohort_contracts::{agent::Attributes, config::EngineConfig, config::ProcessOptions};

use crate::condition::Condition;

/// One node: which capability to call and what to ask it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,

    /// Name resolved against the `CapabilityRegistry` at build time.
    pub capability: String,

    pub instructions: String,

    /// Explicit response schema. When absent the capability infers one.
    #[serde(default)]
    pub schema: Option<Value>,

    /// Ask for reasoning alongside the change set.
    #[serde(default)]
    pub chain_of_thought: bool,
}

/// A branch of a conditional process. Always linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchDefinition {
    pub id: String,

    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,

    #[serde(default)]
    pub options: ProcessOptions,
}

/// A linear process, or a shared prefix followed by two branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessDefinition {
    Linear {
        id: String,
        #[serde(default)]
        nodes: Vec<NodeDefinition>,
        #[serde(default)]
        options: ProcessOptions,
    },
    Conditional {
        id: String,
        /// Shared prefix run by every agent before branching.
        #[serde(default)]
        nodes: Vec<NodeDefinition>,
        condition: Condition,
        if_true: BranchDefinition,
        if_false: BranchDefinition,
        /// Applies to the shared prefix. Branches carry their own.
        #[serde(default)]
        options: ProcessOptions,
    },
}

impl ProcessDefinition {
    pub fn id(&self) -> &str {
        match self {
            ProcessDefinition::Linear { id, .. } | ProcessDefinition::Conditional { id, .. } => id,
        }
    }

    /// Every node in declaration order: prefix, then true branch, then false branch.
    pub fn nodes(&self) -> Vec<&NodeDefinition> {
        match self {
            ProcessDefinition::Linear { nodes, .. } => nodes.iter().collect(),
            ProcessDefinition::Conditional { nodes, if_true, if_false, .. } => nodes
                .iter()
                .chain(&if_true.nodes)
                .chain(&if_false.nodes)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: String,

    #[serde(default)]
    pub attributes: Attributes,
}

/// The top-level structure deserialized from a TOML definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    pub process: ProcessDefinition,

    #[serde(default)]
    pub agents: Vec<AgentDefinition>,
}
