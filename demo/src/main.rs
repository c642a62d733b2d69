//! Cohort process engine demo CLI
//!
//! Runs the reference scenarios, or drives a process definition file with an
//! echo capability.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- height-screening
//!   cargo run -p demo -- population-survey --export-ledger survey.json
//!   cargo run -p demo -- run-file processes/height_screening.toml

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cohort_config::{CapabilityRegistry, CohortConfig};
use cohort_contracts::error::{CohortError, CohortResult};
use cohort_history::{HistoryLedger, RunLedger};
use cohort_ref_sim::{
    scenarios::{height_screening, population_survey},
    ScriptedCapability,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Cohort: step many agents through reasoning-driven processes.
#[derive(Parser)]
#[command(
    name = "cohort-demo",
    about = "Cohort process engine demo",
    long_about = "Runs cohort reference scenarios showing shared-cursor stepping,\n\
                  sticky branch binding, malformed-reply handling, and ledger export."
)]
struct Cli {
    /// Write the sealed history ledger(s) of the run as JSON to this path.
    #[arg(long, global = true, value_name = "PATH")]
    export_ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run both reference scenarios in sequence.
    RunAll,
    /// Scenario 1: Height Screening (conditional process from TOML).
    HeightScreening,
    /// Scenario 2: Population Survey (linear process, stepped by hand).
    PopulationSurvey,
    /// Load a TOML process definition and run it with echo capabilities.
    RunFile {
        /// Path to the definition file.
        path: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for per-step engine output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all().await,
        Command::HeightScreening => {
            height_screening::run_scenario().await.map(|r| vec![r.ledger])
        }
        Command::PopulationSurvey => {
            population_survey::run_scenario().await.map(|r| vec![r.ledger])
        }
        Command::RunFile { path } => run_file(&path).await.map(|ledger| vec![ledger]),
    };

    let result = result.and_then(|ledgers| match &cli.export_ledger {
        Some(path) => export_ledgers(path, &ledgers),
        None => Ok(()),
    });

    match result {
        Ok(()) => {
            println!("All selected runs completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

async fn run_all() -> CohortResult<Vec<RunLedger>> {
    let screening = height_screening::run_scenario().await?;
    let survey = population_survey::run_scenario().await?;
    Ok(vec![screening.ledger, survey.ledger])
}

async fn run_file(path: &Path) -> CohortResult<RunLedger> {
    println!("=== Definition: {} ===", path.display());
    println!();

    let config = CohortConfig::from_file(path)?;
    let mut registry = CapabilityRegistry::new();
    for name in config.capability_names() {
        registry.register(name, Arc::new(ScriptedCapability::echo(name)));
    }

    let mut orchestrator = config.build_orchestrator()?;
    let process = config.build_process(&registry)?;
    println!(
        "  Process:  {} ({} node(s), {} agent(s))",
        process.id(),
        config.process.nodes().len(),
        orchestrator.list_agents().len()
    );

    let report = orchestrator.run_to_completion(process).await;
    println!("  Run complete after {} step(s)", report.steps);
    println!();

    for agent in orchestrator.list_agents() {
        let nodes: Vec<&str> = agent.history.iter().map(|e| e.node_id.0.as_str()).collect();
        println!("  {}: [{}]", agent.id, nodes.join(", "));
        println!("    {}", Value::Object(agent.attributes.clone()));
    }
    println!();

    let ledger = HistoryLedger::record_run(report.run_id, orchestrator.list_agents())?.export();
    println!(
        "  Usage:                  {} call(s), ${:.6}",
        report.usage.calls, report.usage.estimated_cost
    );
    println!(
        "  History ledger:         {} ({} event(s) in chain)",
        if ledger.verify() { "VERIFIED" } else { "FAILED" },
        ledger.events.len()
    );
    println!();
    Ok(ledger)
}

/// One ledger is written as an object; several as an array.
fn export_ledgers(path: &Path, ledgers: &[RunLedger]) -> CohortResult<()> {
    let json = match ledgers {
        [single] => single.to_json_pretty()?,
        many => serde_json::to_string_pretty(many).map_err(|e| CohortError::Ledger {
            reason: format!("failed to serialize ledgers: {}", e),
        })?,
    };
    std::fs::write(path, json).map_err(|e| CohortError::Ledger {
        reason: format!("failed to write ledger to '{}': {}", path.display(), e),
    })?;

    info!(path = %path.display(), ledgers = ledgers.len(), "ledger exported");
    println!("Ledger written to {}", path.display());
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Cohort: Process Execution Engine");
    println!("Reference Demo");
    println!("================================");
    println!();
    println!("Per step:");
    println!("  [1] Every active agent runs its current node concurrently");
    println!("  [2] The node prompts its capability with the agent's attributes");
    println!("  [3] The reply is parsed as a change set and merged into history");
    println!("  [4] Conditional processes bind each agent to one branch, once");
    println!();
}
