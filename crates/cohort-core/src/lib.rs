//! # cohort-core
//!
//! The process execution engine for cohort agents.
//!
//! This crate provides:
//! - The `Capability` and `Predicate` seams
//! - `Node`, the unit that asks a capability for an attribute change set
//! - `LinearProcess` and `ConditionalProcess`
//! - The `Orchestrator` that steps one process across many agents
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cohort_core::{LinearProcess, Node, Orchestrator};
//!
//! let mut orch = Orchestrator::new(EngineConfig::default())?;
//! orch.register_agent("alice", attributes)?;
//! let process = LinearProcess::new("survey").with_node(Node::new("ask", capability, "..."));
//! let report = orch.run_to_completion(process).await;
//! ```

pub mod node;
pub mod orchestrator;
pub mod process;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testing;

pub use node::{Node, NodeOutcome};
pub use orchestrator::{Orchestrator, RunReport, RunState};
pub use process::{BranchBinding, BranchChoice, ConditionalProcess, LinearProcess, Process};
pub use store::AgentStore;
pub use traits::{Capability, Predicate};
