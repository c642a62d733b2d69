//! Conditional processes: a shared prefix, then a per-agent branch.
//!
//! Phase P0 runs the prefix exactly like a linear process, one shared round
//! per step. Once the prefix is exhausted each agent enters phase P1 on its
//! own: the predicate is evaluated once against the agent's attributes, the
//! agent is bound to the true or false branch, and from then on it advances
//! one branch node per step at its own pace.
//!
//! Branch progress is stored per agent in a [`BranchBinding`]. The branch
//! process objects are only read while agents run through them, so any number
//! of agents can be mid-branch on the same branch at different positions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use cohort_contracts::{
    agent::{Agent, AgentId},
    config::ProcessOptions,
    error::{CohortError, CohortResult},
    process::ProcessId,
};

use crate::node::Node;
use crate::process::linear::LinearProcess;
use crate::traits::{Capability, Predicate};

/// Which branch the predicate selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchChoice {
    True,
    False,
}

impl From<bool> for BranchChoice {
    fn from(outcome: bool) -> Self {
        if outcome {
            BranchChoice::True
        } else {
            BranchChoice::False
        }
    }
}

/// One agent's sticky branch assignment for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchBinding {
    pub choice: BranchChoice,
    /// Index of the next branch node this agent will run.
    pub position: usize,
    /// Set once the agent has run the last node of its branch.
    pub completed: bool,
}

/// A shared node prefix followed by a predicate-selected branch per agent.
pub struct ConditionalProcess {
    prefix: LinearProcess,
    predicate: Arc<dyn Predicate>,
    true_branch: LinearProcess,
    false_branch: LinearProcess,
    bindings: BTreeMap<AgentId, BranchBinding>,
    branching: bool,
}

impl ConditionalProcess {
    pub fn new(
        id: impl Into<String>,
        predicate: impl Predicate + 'static,
        true_branch: LinearProcess,
        false_branch: LinearProcess,
    ) -> Self {
        Self::with_shared_predicate(id, Arc::new(predicate), true_branch, false_branch)
    }

    pub fn with_shared_predicate(
        id: impl Into<String>,
        predicate: Arc<dyn Predicate>,
        true_branch: LinearProcess,
        false_branch: LinearProcess,
    ) -> Self {
        Self {
            prefix: LinearProcess::new(id),
            predicate,
            true_branch,
            false_branch,
            bindings: BTreeMap::new(),
            branching: false,
        }
    }

    /// Builder form of [`add_node`](Self::add_node).
    pub fn with_node(mut self, node: Node) -> Self {
        self.add_node(node);
        self
    }

    /// Attach reserved per-process declarations to the shared prefix.
    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.prefix = self.prefix.with_options(options);
        self
    }

    pub fn options(&self) -> &ProcessOptions {
        self.prefix.options()
    }

    /// Append a node to the shared prefix.
    pub fn add_node(&mut self, node: Node) {
        self.prefix.add_node(node);
    }

    pub fn id(&self) -> &ProcessId {
        self.prefix.id()
    }

    pub fn prefix(&self) -> &LinearProcess {
        &self.prefix
    }

    pub fn true_branch(&self) -> &LinearProcess {
        &self.true_branch
    }

    pub fn false_branch(&self) -> &LinearProcess {
        &self.false_branch
    }

    /// The shared prefix cursor.
    pub fn cursor(&self) -> usize {
        self.prefix.cursor()
    }

    pub fn binding(&self, agent_id: &AgentId) -> Option<BranchBinding> {
        self.bindings.get(agent_id).copied()
    }

    pub fn bindings(&self) -> &BTreeMap<AgentId, BranchBinding> {
        &self.bindings
    }

    /// True once the prefix is exhausted and every bound agent finished its
    /// branch.
    pub fn is_complete(&self) -> bool {
        self.prefix.is_complete()
            && self.branching
            && self.bindings.values().all(|binding| binding.completed)
    }

    /// Clear every binding and rewind the prefix and both branches.
    pub fn reset_execution(&mut self) {
        self.prefix.reset_execution();
        self.true_branch.reset_execution();
        self.false_branch.reset_execution();
        self.bindings.clear();
        self.branching = false;
    }

    /// True once the first step has run and until the run completes.
    fn in_progress(&self) -> bool {
        (self.prefix.cursor() > 0 || self.branching) && !self.is_complete()
    }

    /// Swap in new branch processes between runs.
    ///
    /// Fails with `InvalidState` while a run is in progress, whether agents
    /// are still in the shared prefix or mid-branch. On success all bindings
    /// are cleared, as after a reset.
    pub fn update_branches(
        &mut self,
        true_branch: LinearProcess,
        false_branch: LinearProcess,
    ) -> CohortResult<()> {
        if self.in_progress() {
            return Err(CohortError::InvalidState {
                reason: format!(
                    "cannot replace branches of '{}' while a run is in progress",
                    self.id()
                ),
            });
        }
        self.true_branch = true_branch;
        self.false_branch = false_branch;
        self.reset_execution();
        Ok(())
    }

    /// Capabilities of the prefix and both branches, duplicates included.
    pub fn capabilities(&self) -> Vec<Arc<dyn Capability>> {
        let mut capabilities = self.prefix.capabilities();
        capabilities.extend(self.true_branch.capabilities());
        capabilities.extend(self.false_branch.capabilities());
        capabilities
    }

    /// Offline form: each agent runs the prefix, is routed, and runs its
    /// branch to the end before the next agent starts. Bindings are untouched.
    pub async fn execute<'a>(&self, agents: impl IntoIterator<Item = &'a mut Agent>) {
        for agent in agents {
            self.prefix.execute(std::iter::once(&mut *agent)).await;
            let branch = self.branch_for(self.route(agent));
            branch.execute(std::iter::once(agent)).await;
        }
    }

    /// One process-wide step.
    ///
    /// While the prefix has nodes left this is a shared round and always
    /// reports more work. Afterwards, unbound agents are bound and every agent
    /// that has not finished its branch runs one branch node. Returns true
    /// while any agent is still mid-branch.
    pub async fn step_round(&mut self, agents: Vec<&mut Agent>, limiter: &Semaphore) -> bool {
        if !self.prefix.is_complete() {
            self.prefix.step_round(agents, limiter).await;
            return true;
        }
        self.branching = true;

        for agent in &agents {
            if !self.bindings.contains_key(&agent.id) {
                let choice = self.route(agent);
                info!(
                    process_id = %self.prefix.id(),
                    agent_id = %agent.id,
                    branch = ?choice,
                    "agent bound to branch"
                );
                self.bindings.insert(
                    agent.id.clone(),
                    BranchBinding { choice, position: 0, completed: false },
                );
            }
        }

        let (true_branch, false_branch, bindings) =
            (&self.true_branch, &self.false_branch, &self.bindings);

        let runs: Vec<_> = agents
            .into_iter()
            .filter_map(|agent| {
                let mut binding = *bindings.get(&agent.id)?;
                if binding.completed {
                    return None;
                }
                let branch = match binding.choice {
                    BranchChoice::True => true_branch,
                    BranchChoice::False => false_branch,
                };
                Some(async move {
                    let _permit = limiter.acquire().await.ok();
                    let more = branch.advance_agent(agent, &mut binding.position).await;
                    binding.completed = !more;
                    (agent.id.clone(), binding)
                })
            })
            .collect();

        for (agent_id, binding) in join_all(runs).await {
            if binding.completed {
                debug!(
                    process_id = %self.prefix.id(),
                    agent_id = %agent_id,
                    branch = ?binding.choice,
                    "agent finished branch"
                );
            }
            self.bindings.insert(agent_id, binding);
        }

        let more = self.bindings.values().any(|binding| !binding.completed);
        if !more {
            info!(
                process_id = %self.prefix.id(),
                agents = self.bindings.len(),
                "conditional process complete"
            );
        }
        more
    }

    fn route(&self, agent: &Agent) -> BranchChoice {
        BranchChoice::from(self.predicate.evaluate(&agent.attributes))
    }

    fn branch_for(&self, choice: BranchChoice) -> &LinearProcess {
        match choice {
            BranchChoice::True => &self.true_branch,
            BranchChoice::False => &self.false_branch,
        }
    }
}

impl fmt::Debug for ConditionalProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalProcess")
            .field("prefix", &self.prefix)
            .field("true_branch", &self.true_branch)
            .field("false_branch", &self.false_branch)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
