//! Scenario 1: Height Screening
//!
//! A conditional process loaded from TOML. Every subject runs the shared
//! `measure` node, is bound once to a branch by height, and then follows only
//! that branch.
//!
//! Subjects for the demo run:
//!   A  160 cm  → standard fit (fit, confirm)
//!   B  100 cm  → custom fit (refer)
//!   C  230 cm  → custom fit; the referral reply breaks the node schema and is
//!                merged as an error marker
//!   D  no reading → `measure` fails and is skipped; routed to custom fit

use std::sync::Arc;

use serde_json::Value;

use cohort_config::{CapabilityRegistry, CohortConfig};
use cohort_contracts::{agent::AgentId, error::CohortResult};
use cohort_core::{process::Process, BranchChoice};

use crate::cohort_data::screening_reply;
use crate::scenarios::ScenarioReport;
use crate::scripted::ScriptedCapability;

// ── Process TOML ──────────────────────────────────────────────────────────────

/// Embedded process definition, engine settings, and subjects.
pub const HEIGHT_SCREENING: &str = include_str!("../../processes/height_screening.toml");

// ── Scenario runner ───────────────────────────────────────────────────────────

pub async fn run_scenario() -> CohortResult<ScenarioReport> {
    println!("=== Scenario 1: Height Screening ===");
    println!();

    let config = CohortConfig::from_toml_str(HEIGHT_SCREENING)?;
    let screener = Arc::new(ScriptedCapability::new("screener", screening_reply));
    let registry = CapabilityRegistry::new().with("screener", screener);

    let mut orchestrator = config.build_orchestrator()?;
    let process = config.build_process(&registry)?;

    println!("  Process:  {} (conditional, branch on 150 <= height <= 200)", process.id());
    for agent in orchestrator.list_agents() {
        let height = agent.attribute("height").map(Value::to_string);
        println!("  Subject {}: height {}", agent.id, height.as_deref().unwrap_or("unknown"));
    }
    println!();

    let report = orchestrator.run_to_completion(process).await;
    println!("  Run complete after {} step(s)", report.steps);
    println!();

    if let Some(Process::Conditional(process)) = orchestrator.current_process() {
        for (agent_id, binding) in process.bindings() {
            let branch = match binding.choice {
                BranchChoice::True => process.true_branch().id(),
                BranchChoice::False => process.false_branch().id(),
            };
            println!("  {} → {}", agent_id, branch);
        }
        println!();
    }

    for agent in orchestrator.list_agents() {
        let nodes: Vec<&str> = agent.history.iter().map(|e| e.node_id.0.as_str()).collect();
        let marker = if agent.attribute("error").is_some() { "  [error marker]" } else { "" };
        println!("  {}: [{}]{}", agent.id, nodes.join(", "), marker);
    }
    println!();

    let summary =
        ScenarioReport::collect("height-screening", &orchestrator, report.run_id, report.steps)?;
    summary.print_footer();

    let a = orchestrator.get_agent(&AgentId::from("A"))?;
    if let Some(reasoning) = a.history.iter().find_map(|e| e.reasoning.as_deref()) {
        println!("  Reasoning recorded for A: {}", reasoning);
        println!();
    }

    println!("  Scenario 1 complete.");
    println!();
    Ok(summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
