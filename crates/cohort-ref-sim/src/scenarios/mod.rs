//! Reference scenarios.
//!
//! Each scenario wires real engine components (orchestrator, processes,
//! history ledger) to the scripted capability and fictional subjects, prints
//! a readable trace, and returns a `ScenarioReport`.

pub mod height_screening;
pub mod population_survey;

use serde::Serialize;

use cohort_contracts::{
    agent::{AgentId, Attributes},
    capability::UsageStats,
    error::CohortResult,
    process::RunId,
};
use cohort_core::Orchestrator;
use cohort_history::{HistoryLedger, RunLedger};

/// Final state of one agent after a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub history_len: usize,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub run_id: RunId,
    pub steps: u64,
    pub agents: Vec<AgentSummary>,
    pub usage: UsageStats,
    /// Sealed, hash-chained export of every agent's history.
    pub ledger: RunLedger,
}

impl ScenarioReport {
    /// Collect agent summaries and seal the ledger for a finished run.
    pub(crate) fn collect(
        name: &str,
        orchestrator: &Orchestrator,
        run_id: RunId,
        steps: u64,
    ) -> CohortResult<Self> {
        let ledger = HistoryLedger::record_run(run_id, orchestrator.list_agents())?;
        let agents = orchestrator
            .list_agents()
            .into_iter()
            .map(|agent| AgentSummary {
                id: agent.id.clone(),
                history_len: agent.history.len(),
                attributes: agent.attributes.clone(),
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            run_id,
            steps,
            agents,
            usage: orchestrator.aggregate_usage(),
            ledger: ledger.export(),
        })
    }

    pub fn agent(&self, id: &str) -> Option<&AgentSummary> {
        self.agents.iter().find(|a| a.id.as_str() == id)
    }

    /// Print usage and ledger lines shared by every scenario.
    pub(crate) fn print_footer(&self) {
        println!(
            "  Usage:                  {} call(s), {} in / {} out tokens, ${:.6}",
            self.usage.calls,
            self.usage.input_tokens,
            self.usage.output_tokens,
            self.usage.estimated_cost
        );
        println!(
            "  History ledger:         {} ({} event(s) in chain)",
            if self.ledger.verify() { "VERIFIED" } else { "FAILED" },
            self.ledger.events.len()
        );
        println!();
    }
}
