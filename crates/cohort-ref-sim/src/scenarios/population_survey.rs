//! Scenario 2: Population Survey
//!
//! A three-node linear process built in code and stepped by hand. All four
//! respondents finish node `k` before any of them starts node `k + 1`; the
//! trace prints the shared cursor after every step.
//!
//! The `income` reply arrives inside a fenced code block and is still parsed;
//! the `satisfaction` node asks for reasoning, which lands in history.

use std::sync::Arc;

use serde_json::json;

use cohort_contracts::{
    agent::Attributes,
    config::EngineConfig,
    error::CohortResult,
};
use cohort_core::{traits::Capability, LinearProcess, Node, Orchestrator};

use crate::cohort_data::{survey_reply, SURVEY_RESPONDENTS};
use crate::scenarios::ScenarioReport;
use crate::scripted::ScriptedCapability;

fn survey_process(surveyor: Arc<dyn Capability>) -> LinearProcess {
    LinearProcess::new("population-survey")
        .with_node(Node::new(
            "age-band",
            Arc::clone(&surveyor),
            "[age-band] Classify the respondent's age as `age_band`.",
        ))
        .with_node(Node::new(
            "income",
            Arc::clone(&surveyor),
            "[income] Estimate the household income bracket as `income_bracket`.",
        ))
        .with_node(
            Node::new(
                "satisfaction",
                surveyor,
                "[satisfaction] Rate satisfaction with local services from 1 to 5 as `satisfaction`.",
            )
            .with_chain_of_thought(true),
        )
}

fn respondent(age: u64, region: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("age".to_string(), json!(age));
    attributes.insert("region".to_string(), json!(region));
    attributes
}

// ── Scenario runner ───────────────────────────────────────────────────────────

pub async fn run_scenario() -> CohortResult<ScenarioReport> {
    println!("=== Scenario 2: Population Survey ===");
    println!();

    let surveyor: Arc<dyn Capability> = Arc::new(ScriptedCapability::new("surveyor", survey_reply));
    let process = survey_process(surveyor);
    let node_count = process.len();

    let mut orchestrator =
        Orchestrator::new(EngineConfig { step_pause_ms: 0, ..EngineConfig::default() })?;
    for (id, age, region) in SURVEY_RESPONDENTS {
        orchestrator.register_agent(id, respondent(age, region))?;
        println!("  Respondent {}: age {}, region {}", id, age, region);
    }
    println!();

    let run_id = orchestrator.initialize_run(process);
    loop {
        let more = orchestrator.step().await;
        let state = orchestrator.run_state();
        println!(
            "  Step {}: cursor {}/{}{}",
            state.steps,
            state.cursor,
            node_count,
            if more { "" } else { " (complete)" }
        );
        if !more {
            break;
        }
    }
    println!();

    for agent in orchestrator.list_agents() {
        println!(
            "  {}: age_band={} income={} satisfaction={}",
            agent.id,
            agent.attribute("age_band").map_or("-".to_string(), |v| v.to_string()),
            agent.attribute("income_bracket").map_or("-".to_string(), |v| v.to_string()),
            agent.attribute("satisfaction").map_or("-".to_string(), |v| v.to_string()),
        );
    }
    println!();

    let steps = orchestrator.run_state().steps;
    let summary = ScenarioReport::collect("population-survey", &orchestrator, run_id, steps)?;
    summary.print_footer();

    println!("  Scenario 2 complete.");
    println!();
    Ok(summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_every_respondent_answers_every_node() {
        let report = run_scenario().await.unwrap();

        assert_eq!(report.steps, 3);
        assert_eq!(report.agents.len(), 4);
        assert!(report.agents.iter().all(|a| a.history_len == 3));
        assert_eq!(report.usage.calls, 12);
        assert_eq!(report.ledger.events.len(), 12);
        assert!(report.ledger.verify());
    }

    #[tokio::test]
    async fn test_fenced_replies_are_parsed() {
        let report = run_scenario().await.unwrap();

        let senior = &report.agent("respondent-3").unwrap().attributes;
        assert_eq!(senior["age_band"], json!("65+"));
        assert_eq!(senior["income_bracket"], json!("lower"));
        assert_eq!(senior["satisfaction"], json!(4));
        assert!(!senior.contains_key("error"));
    }

    #[tokio::test]
    async fn test_reasoning_only_on_thinking_node() {
        let report = run_scenario().await.unwrap();

        let with_reasoning: Vec<&str> = report
            .ledger
            .events
            .iter()
            .filter(|e| e.entry.reasoning.is_some())
            .map(|e| e.entry.node_id.0.as_str())
            .collect();
        assert_eq!(with_reasoning, vec!["satisfaction"; 4]);
    }
}
