//! The two seams the engine is built around.
//!
//! - `Capability`: the external reasoning service a node calls
//! - `Predicate`: the branch condition of a conditional process
//!
//! Both are held behind `Arc<dyn _>` handles. Nothing in the engine is a
//! process-wide singleton: usage counters live on the capability handle that
//! was injected, and two handles are two independent counters.

use async_trait::async_trait;
use serde_json::Value;

use cohort_contracts::{
    agent::Attributes,
    capability::{PromptRequest, Reply, UsageStats},
    error::CohortResult,
};

/// A reasoning capability consumed by nodes.
///
/// Implementations are expected to use interior mutability for their usage
/// counters; every method takes `&self` so one handle can be shared by many
/// nodes and called for many agents concurrently.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Ask for a structural change only.
    async fn prompt(&self, request: &PromptRequest) -> CohortResult<Reply>;

    /// Ask for a structural change plus the reasoning behind it.
    ///
    /// The returned `Reply::reasoning` should be populated.
    async fn prompt_thinking(&self, request: &PromptRequest) -> CohortResult<Reply>;

    /// Derive a response schema from a sample object.
    ///
    /// Called by nodes that carry no explicit schema, with the agent's current
    /// attributes as the sample.
    fn create_schema(&self, sample: &Value) -> Value;

    /// Counters accumulated since construction or the last reset.
    fn usage_stats(&self) -> UsageStats;

    /// Zero this capability's counters.
    fn reset_usage_stats(&self);
}

/// Branch condition evaluated once per agent per run.
pub trait Predicate: Send + Sync {
    fn evaluate(&self, attributes: &Attributes) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Attributes) -> bool + Send + Sync,
{
    fn evaluate(&self, attributes: &Attributes) -> bool {
        self(attributes)
    }
}
