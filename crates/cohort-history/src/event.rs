//! Ledger event and export types.
//!
//! `LedgerEvent` wraps one agent history entry with sequence numbering and
//! the SHA-256 hashes that make tampering detectable. `RunLedger` is the
//! sealed record of one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cohort_contracts::{
    agent::{AgentId, HistoryEntry},
    error::{CohortError, CohortResult},
    process::RunId,
};

use crate::chain::verify_chain;

/// One history entry in the hash chain of a run.
///
/// Modifying any field, including those of the embedded `entry`, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub run_id: RunId,

    /// The agent whose history this entry came from.
    pub agent_id: AgentId,

    pub entry: HistoryEntry,

    /// Hash of the previous event, or `GENESIS_HASH` for the first event.
    pub prev_hash: String,

    /// Computed by `hash_event()` over (run_id, sequence, prev_hash,
    /// agent_id, canonical JSON of entry).
    pub this_hash: String,
}

impl LedgerEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed ledger for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLedger {
    pub run_id: RunId,

    /// Events in chain order.
    pub events: Vec<LedgerEvent>,

    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last event. Empty if the run recorded nothing.
    pub terminal_hash: String,
}

impl RunLedger {
    /// Chain linkage and hashes hold, and `terminal_hash` matches the last event.
    pub fn verify(&self) -> bool {
        let terminal = self.events.last().map(|e| e.this_hash.as_str()).unwrap_or_default();
        verify_chain(&self.events) && terminal == self.terminal_hash
    }

    pub fn to_json_pretty(&self) -> CohortResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CohortError::Ledger {
            reason: format!("failed to serialize ledger: {}", e),
        })
    }

    pub fn from_json(s: &str) -> CohortResult<Self> {
        serde_json::from_str(s).map_err(|e| CohortError::Ledger {
            reason: format!("failed to parse ledger JSON: {}", e),
        })
    }
}
