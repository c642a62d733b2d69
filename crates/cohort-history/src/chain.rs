//! Hash-chain primitives.
//!
//! Hash input layout (bytes, in order):
//!   1. run id as its hyphenated UUID string
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. agent id as UTF-8 bytes
//!   5. canonical JSON of the history entry

use sha2::{Digest, Sha256};

use cohort_contracts::{
    agent::{AgentId, HistoryEntry},
    error::{CohortError, CohortResult},
    process::RunId,
};

use crate::event::LedgerEvent;

/// Compute the SHA-256 hash for one ledger event.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_event(
    run_id: &RunId,
    sequence: u64,
    prev_hash: &str,
    agent_id: &AgentId,
    entry: &HistoryEntry,
) -> CohortResult<String> {
    let entry_json = serde_json::to_vec(entry).map_err(|e| CohortError::Ledger {
        reason: format!("history entry is not serializable: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(run_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(agent_id.as_str().as_bytes());
    hasher.update(&entry_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify prev-hash linkage and recomputed hashes for every event.
///
/// An empty chain is valid. Sequence numbers must run 0, 1, 2, ... without gaps.
pub fn verify_chain(events: &[LedgerEvent]) -> bool {
    let mut expected_prev = LedgerEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_event(
            &event.run_id,
            event.sequence,
            &event.prev_hash,
            &event.agent_id,
            &event.entry,
        );
        match recomputed {
            Ok(hash) if hash == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
