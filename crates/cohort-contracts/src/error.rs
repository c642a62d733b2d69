//! Error types for the cohort engine.
//!
//! Only some of these ever reach a caller. Capability failures and malformed
//! replies are absorbed per agent by node execution, and stepping a finished
//! or unbound run reports "no more work" instead of failing. The variants
//! still exist so that absorbed failures can be logged and reported uniformly.

use thiserror::Error;

/// The unified error type for the cohort crates.
#[derive(Debug, Error)]
pub enum CohortError {
    /// The reasoning capability failed (network, provider, or internal error).
    #[error("capability call failed: {reason}")]
    CapabilityCall { reason: String },

    /// A capability reply could not be turned into a change set.
    #[error("response parse failed: {reason}")]
    ResponseParse { reason: String },

    /// An agent id was looked up that was never registered.
    #[error("agent '{agent_id}' not found")]
    NotFound { agent_id: String },

    /// An agent id was registered twice.
    #[error("agent '{agent_id}' is already registered")]
    DuplicateAgent { agent_id: String },

    /// An operation was attempted in a state that does not allow it.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// Engine or process configuration is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A response schema could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A history ledger could not be built or written.
    #[error("ledger error: {reason}")]
    Ledger { reason: String },
}

/// Convenience alias used throughout the cohort crates.
pub type CohortResult<T> = Result<T, CohortError>;
