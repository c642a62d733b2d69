//! Engine and per-process configuration.
//!
//! `max_concurrency` and `step_pause_ms` are enforced by the orchestrator.
//! `retries` and `timeout_ms` are accepted and validated but reserved: node
//! execution makes exactly one capability call, with no deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CohortError, CohortResult};

/// Orchestrator-wide settings, usually read from the `[engine]` TOML table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on node executions in flight during one step.
    pub max_concurrency: usize,
    /// Pause between steps in `Orchestrator::run_to_completion`.
    pub step_pause_ms: u64,
    /// Reserved. Retry count for failed capability calls.
    pub retries: u32,
    /// Reserved. Per-call deadline in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            step_pause_ms: 100,
            retries: 0,
            timeout_ms: 30_000,
        }
    }
}

impl EngineConfig {
    /// Reject settings the orchestrator cannot run with.
    pub fn validate(&self) -> CohortResult<()> {
        if self.max_concurrency == 0 {
            return Err(CohortError::Config {
                reason: "max_concurrency must be at least 1".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(CohortError::Config {
                reason: "timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }
}

/// Per-process declarations. Both fields are reserved and never consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    pub retries: u32,
    pub timeout_ms: Option<u64>,
}
