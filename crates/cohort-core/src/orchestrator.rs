//! The orchestrator: one bound process driven over a snapshot of agents.
//!
//! A run is driven by an external caller issuing sequential [`Orchestrator::step`]
//! calls. Within one step every active agent's node execution is dispatched
//! concurrently, at most `max_concurrency` at a time, and the step returns
//! only after all of them finish. Nothing runs between steps.
//!
//! Failure handling per category:
//!
//!   capability call failed  → logged by the node, agent skipped, step continues
//!   malformed reply         → merged as an error marker, step continues
//!   unknown agent id        → `CohortError::NotFound` from the accessors
//!   step without work       → `step()` returns false
//!
//! No failure of one agent aborts the run or blocks other agents.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use cohort_contracts::{
    agent::{Agent, AgentId, Attributes},
    capability::UsageStats,
    config::EngineConfig,
    error::{CohortError, CohortResult},
    process::{ProcessId, RunId},
};

use crate::process::Process;
use crate::store::AgentStore;
use crate::traits::Capability;

/// Bookkeeping for the current run. Replaced by every `initialize_run`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunState {
    pub run_id: RunId,
    pub process_id: Option<ProcessId>,
    /// Agents snapshotted at run start. Agents registered later sit out the run.
    pub active: BTreeSet<AgentId>,
    /// Mirror of the bound process's shared cursor.
    pub cursor: usize,
    /// Steps taken so far, including the final one that reported no more work.
    pub steps: u64,
    pub complete: bool,
}

/// Summary returned by [`Orchestrator::run_to_completion`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub process_id: ProcessId,
    pub steps: u64,
    /// Aggregate usage across every capability tracked so far.
    pub usage: UsageStats,
}

/// Coordinates a single active process against the registered agents.
pub struct Orchestrator {
    store: AgentStore,
    config: EngineConfig,
    limiter: Semaphore,
    process: Option<Process>,
    run: RunState,
    capabilities: Vec<Arc<dyn Capability>>,
}

impl Orchestrator {
    /// Create an orchestrator with validated settings.
    pub fn new(config: EngineConfig) -> CohortResult<Self> {
        config.validate()?;
        if config.max_concurrency > Semaphore::MAX_PERMITS {
            return Err(CohortError::Config {
                reason: format!(
                    "max_concurrency {} exceeds the limit of {}",
                    config.max_concurrency,
                    Semaphore::MAX_PERMITS
                ),
            });
        }
        Ok(Self {
            store: AgentStore::new(),
            limiter: Semaphore::new(config.max_concurrency),
            config,
            process: None,
            run: RunState::default(),
            capabilities: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Agents ───────────────────────────────────────────────────────────────

    pub fn register_agent(
        &mut self,
        id: impl Into<AgentId>,
        attributes: Attributes,
    ) -> CohortResult<()> {
        self.store.register(id, attributes)
    }

    /// Fails with `NotFound` if `id` was never registered.
    pub fn get_agent(&self, id: &AgentId) -> CohortResult<&Agent> {
        self.store.get(id)
    }

    pub fn list_agents(&self) -> Vec<&Agent> {
        self.store.list()
    }

    // ── Runs ─────────────────────────────────────────────────────────────────

    /// Bind `process` as current and start a fresh run over every registered
    /// agent.
    ///
    /// The process is reset first, any previously bound process is dropped,
    /// and every capability reachable from the process is tracked for usage
    /// aggregation.
    pub fn initialize_run(&mut self, process: impl Into<Process>) -> RunId {
        let mut process = process.into();
        process.reset_execution();

        for capability in process.capabilities() {
            self.register_capability(capability);
        }

        self.run = RunState {
            run_id: RunId::new(),
            process_id: Some(process.id().clone()),
            active: self.store.ids(),
            cursor: 0,
            steps: 0,
            complete: false,
        };

        info!(
            run_id = %self.run.run_id,
            process_id = %process.id(),
            conditional = process.is_conditional(),
            agents = self.run.active.len(),
            max_concurrency = self.config.max_concurrency,
            "run initialized"
        );
        debug!(
            retries = self.config.retries,
            timeout_ms = self.config.timeout_ms,
            "retries and timeout are declared but not enforced"
        );

        self.process = Some(process);
        self.run.run_id
    }

    /// Advance the run by one step. Returns true while work remains.
    ///
    /// Returns false without doing anything when no process is bound or the
    /// run already completed.
    pub async fn step(&mut self) -> bool {
        if self.run.complete {
            debug!(run_id = %self.run.run_id, "step on completed run ignored");
            return false;
        }
        let Some(process) = self.process.as_mut() else {
            debug!("step with no bound process ignored");
            return false;
        };

        let agents = self.store.select_mut(&self.run.active);
        let more = process.step_round(agents, &self.limiter).await;

        self.run.steps += 1;
        self.run.cursor = process.cursor();
        debug!(
            run_id = %self.run.run_id,
            step = self.run.steps,
            cursor = self.run.cursor,
            more,
            "step finished"
        );

        if !more {
            self.run.complete = true;
            info!(
                run_id = %self.run.run_id,
                process_id = %process.id(),
                steps = self.run.steps,
                "run complete"
            );
        }
        more
    }

    /// Initialize a run and step it until no work remains, pausing
    /// `step_pause_ms` between steps.
    pub async fn run_to_completion(&mut self, process: impl Into<Process>) -> RunReport {
        let run_id = self.initialize_run(process);
        let pause = self.config.step_pause();

        while self.step().await {
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        RunReport {
            run_id,
            process_id: self.run.process_id.clone().unwrap_or_else(|| ProcessId::new("")),
            steps: self.run.steps,
            usage: self.aggregate_usage(),
        }
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn current_process(&self) -> Option<&Process> {
        self.process.as_ref()
    }

    /// Unbind and return the current process so it can be reused.
    pub fn take_process(&mut self) -> Option<Process> {
        self.process.take()
    }

    // ── Usage ────────────────────────────────────────────────────────────────

    /// Track `capability` for usage aggregation. Returns false if this exact
    /// instance is already tracked.
    pub fn register_capability(&mut self, capability: Arc<dyn Capability>) -> bool {
        if self.capabilities.iter().any(|known| same_instance(known, &capability)) {
            return false;
        }
        debug!(capability = %capability.name(), "tracking capability usage");
        self.capabilities.push(capability);
        true
    }

    /// Number of distinct capability instances tracked so far.
    pub fn tracked_capabilities(&self) -> usize {
        self.capabilities.len()
    }

    /// Sum of every tracked capability's own counters.
    pub fn aggregate_usage(&self) -> UsageStats {
        self.capabilities
            .iter()
            .fold(UsageStats::default(), |total, capability| total + capability.usage_stats())
    }

    /// Zero the counters of every tracked capability.
    pub fn reset_usage(&self) {
        for capability in &self.capabilities {
            capability.reset_usage_stats();
        }
        info!(capabilities = self.capabilities.len(), "usage counters reset");
    }
}

/// Identity comparison of two capability handles, ignoring vtables.
fn same_instance(a: &Arc<dyn Capability>, b: &Arc<dyn Capability>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
