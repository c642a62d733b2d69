//! Linear processes: an ordered node list and one shared cursor.
//!
//! In a process-wide round every active agent runs the node at the cursor, the
//! round is joined, and the cursor advances once. All agents therefore finish
//! node `k` before any agent starts node `k + 1`.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use cohort_contracts::{
    agent::Agent,
    config::ProcessOptions,
    process::ProcessId,
};

use crate::node::Node;
use crate::traits::Capability;

/// An ordered sequence of nodes with a shared step cursor.
///
/// The cursor lives in `[0, len]` and only moves forward until
/// [`reset_execution`](Self::reset_execution). The process is complete exactly
/// when the cursor has reached the node count.
#[derive(Debug, Clone)]
pub struct LinearProcess {
    id: ProcessId,
    nodes: Vec<Node>,
    options: ProcessOptions,
    cursor: usize,
}

impl LinearProcess {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ProcessId::new(id),
            nodes: Vec::new(),
            options: ProcessOptions::default(),
            cursor: 0,
        }
    }

    /// Builder form of [`add_node`](Self::add_node).
    pub fn with_node(mut self, node: Node) -> Self {
        self.add_node(node);
        self
    }

    /// Attach reserved per-process declarations.
    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn id(&self) -> &ProcessId {
        &self.id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Index of the next node to run.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.nodes.len()
    }

    /// Rewind the cursor so the process can run again.
    pub fn reset_execution(&mut self) {
        self.cursor = 0;
    }

    /// Every capability referenced by this process's nodes, duplicates included.
    pub fn capabilities(&self) -> Vec<Arc<dyn Capability>> {
        self.nodes.iter().map(|node| Arc::clone(node.capability())).collect()
    }

    /// Run the node at the process's own cursor for one agent, then advance.
    ///
    /// Returns false once the process is exhausted. This lets a caller drive a
    /// single agent through the process without regard to any other agent.
    pub async fn execute_agent_step(&mut self, agent: &mut Agent) -> bool {
        let mut position = self.cursor;
        let more = self.advance_agent(agent, &mut position).await;
        self.cursor = position;
        more
    }

    /// Run the node at `position` for one agent and advance `position`.
    ///
    /// The process itself is not mutated, so many agents can progress through
    /// the same process object, each with its own position.
    pub async fn advance_agent(&self, agent: &mut Agent, position: &mut usize) -> bool {
        let Some(node) = self.nodes.get(*position) else {
            return false;
        };
        node.execute_within(agent, Some(&self.id)).await;
        *position += 1;
        *position < self.nodes.len()
    }

    /// Run every agent through every node, agent by agent, node by node.
    ///
    /// Offline form: the shared cursor is neither read nor moved.
    pub async fn execute<'a>(&self, agents: impl IntoIterator<Item = &'a mut Agent>) {
        for agent in agents {
            for node in &self.nodes {
                node.execute_within(agent, Some(&self.id)).await;
            }
        }
    }

    /// One process-wide round: every agent runs the node at the shared cursor
    /// concurrently (bounded by `limiter`), then the cursor advances once.
    ///
    /// Returns true while nodes remain after this round.
    pub async fn step_round(&mut self, agents: Vec<&mut Agent>, limiter: &Semaphore) -> bool {
        let Some(node) = self.nodes.get(self.cursor) else {
            return false;
        };
        let process_id = &self.id;

        let outcomes = join_all(agents.into_iter().map(|agent| async move {
            let _permit = limiter.acquire().await.ok();
            node.execute_within(agent, Some(process_id)).await
        }))
        .await;

        let skipped = outcomes.iter().filter(|outcome| !outcome.mutated()).count();
        debug!(
            process_id = %self.id,
            node_id = %node.id(),
            step = self.cursor,
            agents = outcomes.len(),
            skipped,
            "round complete"
        );

        self.cursor += 1;
        if self.is_complete() {
            info!(process_id = %self.id, nodes = self.nodes.len(), "linear process complete");
        }
        !self.is_complete()
    }
}
