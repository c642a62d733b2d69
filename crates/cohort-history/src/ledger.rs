//! Building a ledger from a finished run.
//!
//! Agents are recorded in id order and each agent's entries in history order,
//! so the same run always produces the same event sequence.

use chrono::Utc;
use tracing::info;

use cohort_contracts::{
    agent::{Agent, AgentId, HistoryEntry},
    error::CohortResult,
    process::RunId,
};

use crate::{
    chain::{hash_event, verify_chain},
    event::{LedgerEvent, RunLedger},
};

/// An append-only, hash-chained record of agent history entries for one run.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    run_id: RunId,
    events: Vec<LedgerEvent>,
    last_hash: String,
}

impl HistoryLedger {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            events: Vec::new(),
            last_hash: LedgerEvent::GENESIS_HASH.to_string(),
        }
    }

    /// Record every history entry of `agents` for `run_id`.
    pub fn record_run<'a>(
        run_id: RunId,
        agents: impl IntoIterator<Item = &'a Agent>,
    ) -> CohortResult<Self> {
        let mut agents: Vec<&Agent> = agents.into_iter().collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));

        let mut ledger = Self::new(run_id);
        for agent in agents {
            ledger.record_agent(agent)?;
        }

        info!(
            run_id = %run_id,
            event_count = ledger.events.len(),
            terminal_hash = %ledger.last_hash,
            "history ledger recorded"
        );
        Ok(ledger)
    }

    /// Append every entry of one agent's history.
    pub fn record_agent(&mut self, agent: &Agent) -> CohortResult<()> {
        for entry in &agent.history {
            self.append(&agent.id, entry)?;
        }
        Ok(())
    }

    /// Append one entry to the chain.
    pub fn append(&mut self, agent_id: &AgentId, entry: &HistoryEntry) -> CohortResult<()> {
        let sequence = self.events.len() as u64;
        let prev_hash = self.last_hash.clone();
        let this_hash = hash_event(&self.run_id, sequence, &prev_hash, agent_id, entry)?;

        self.events.push(LedgerEvent {
            sequence,
            run_id: self.run_id,
            agent_id: agent_id.clone(),
            entry: entry.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        self.last_hash = this_hash;
        Ok(())
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.events)
    }

    /// Seal the events recorded so far.
    pub fn export(&self) -> RunLedger {
        RunLedger {
            run_id: self.run_id,
            events: self.events.clone(),
            exported_at: Utc::now(),
            terminal_hash: self.events.last().map(|e| e.this_hash.clone()).unwrap_or_default(),
        }
    }
}
