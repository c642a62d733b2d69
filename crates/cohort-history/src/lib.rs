//! # cohort-history
//!
//! Tamper-evident export of a run's agent histories.
//!
//! Every history entry is wrapped in a `LedgerEvent` that links to the
//! previous event via its SHA-256 hash. Changing any recorded change set,
//! reasoning string, or timestamp breaks the chain and is caught by
//! `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cohort_history::HistoryLedger;
//!
//! let report = orchestrator.run_to_completion(process).await;
//! let ledger = HistoryLedger::record_run(report.run_id, orchestrator.list_agents())?;
//! assert!(ledger.verify_integrity());
//! std::fs::write("run.json", ledger.export().to_json_pretty()?)?;
//! ```

pub mod chain;
pub mod event;
pub mod ledger;

pub use chain::{hash_event, verify_chain};
pub use event::{LedgerEvent, RunLedger};
pub use ledger::HistoryLedger;

// ── Tests ─────────────────────────────────────────────────────────────────────
