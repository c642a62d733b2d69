//! # cohort-ref-sim
//!
//! Reference simulation for the cohort process engine.
//!
//! Demonstrates two scenarios with a scripted, deterministic capability:
//!
//! 1. **Height Screening**: a conditional process loaded from TOML, with
//!    sticky per-agent branch binding, a skipped capability call, and a
//!    schema-violating reply merged as an error marker.
//! 2. **Population Survey**: a linear process stepped by hand, showing the
//!    shared cursor advancing once per step across all respondents.
//!
//! All data is hardcoded and fictional. No external services are contacted.

pub mod cohort_data;
pub mod scenarios;
pub mod scripted;

pub use scenarios::{AgentSummary, ScenarioReport};
pub use scripted::ScriptedCapability;
