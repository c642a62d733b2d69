//! Loading definitions and turning them into runnable processes.
//!
//! Build algorithm:
//!
//! 1. Resolve every node's `capability` name against the registry. The first
//!    unknown name fails the whole build with `CohortError::Config`.
//! 2. Build the prefix (or the linear node list) in declaration order.
//! 3. For conditional processes, build both branches and wrap the parsed
//!    `Condition` as the predicate.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use cohort_contracts::error::{CohortError, CohortResult};
use cohort_core::{
    node::Node,
    process::{ConditionalProcess, LinearProcess, Process},
    traits::Capability,
    Orchestrator,
};

use crate::definition::{BranchDefinition, CohortConfig, NodeDefinition, ProcessDefinition};

/// Named capability handles available to process definitions.
///
/// Registering the same handle under two names is allowed; usage is still
/// aggregated once per handle by the orchestrator.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: BTreeMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, capability: Arc<dyn Capability>) -> Self {
        self.register(name, capability);
        self
    }

    /// Register `capability` under `name`, replacing any earlier entry.
    pub fn register(&mut self, name: impl Into<String>, capability: Arc<dyn Capability>) {
        self.entries.insert(name.into(), capability);
    }

    pub fn resolve(&self, name: &str) -> CohortResult<Arc<dyn Capability>> {
        self.entries.get(name).cloned().ok_or_else(|| CohortError::Config {
            reason: format!("no capability registered under '{}'", name),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl CohortConfig {
    /// Parse `s` as TOML and validate the engine settings.
    ///
    /// Returns `CohortError::Config` if the TOML is malformed, does not match
    /// the expected shape, or carries unusable engine settings.
    pub fn from_toml_str(s: &str) -> CohortResult<Self> {
        let config: CohortConfig = toml::from_str(s).map_err(|e| CohortError::Config {
            reason: format!("failed to parse process TOML: {}", e),
        })?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CohortResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CohortError::Config {
            reason: format!("failed to read process file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Distinct capability names referenced anywhere in the process.
    pub fn capability_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.process.nodes().into_iter().map(|n| n.capability.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Construct the described process against `registry`.
    pub fn build_process(&self, registry: &CapabilityRegistry) -> CohortResult<Process> {
        let process = match &self.process {
            ProcessDefinition::Linear { id, nodes, options } => {
                let mut process = LinearProcess::new(id.as_str()).with_options(options.clone());
                for node in nodes {
                    process.add_node(build_node(node, registry)?);
                }
                Process::Linear(process)
            }
            ProcessDefinition::Conditional { id, nodes, condition, if_true, if_false, options } => {
                let mut process = ConditionalProcess::new(
                    id.as_str(),
                    condition.clone(),
                    build_branch(if_true, registry)?,
                    build_branch(if_false, registry)?,
                )
                .with_options(options.clone());
                for node in nodes {
                    process.add_node(build_node(node, registry)?);
                }
                Process::Conditional(process)
            }
        };

        debug!(
            process_id = %process.id(),
            conditional = process.is_conditional(),
            "process built from definition"
        );
        Ok(process)
    }

    /// An orchestrator with this file's engine settings and agents registered.
    pub fn build_orchestrator(&self) -> CohortResult<Orchestrator> {
        let mut orchestrator = Orchestrator::new(self.engine.clone())?;
        for agent in &self.agents {
            orchestrator.register_agent(agent.id.as_str(), agent.attributes.clone())?;
        }
        Ok(orchestrator)
    }
}

fn build_node(definition: &NodeDefinition, registry: &CapabilityRegistry) -> CohortResult<Node> {
    let capability = registry.resolve(&definition.capability).map_err(|_| CohortError::Config {
        reason: format!(
            "node '{}' references unknown capability '{}'",
            definition.id, definition.capability
        ),
    })?;
    let mut node = Node::new(definition.id.as_str(), capability, definition.instructions.as_str())
        .with_chain_of_thought(definition.chain_of_thought);
    if let Some(schema) = &definition.schema {
        node = node.with_schema(schema.clone());
    }
    Ok(node)
}

fn build_branch(
    definition: &BranchDefinition,
    registry: &CapabilityRegistry,
) -> CohortResult<LinearProcess> {
    let mut branch =
        LinearProcess::new(definition.id.as_str()).with_options(definition.options.clone());
    for node in &definition.nodes {
        branch.add_node(build_node(node, registry)?);
    }
    Ok(branch)
}
