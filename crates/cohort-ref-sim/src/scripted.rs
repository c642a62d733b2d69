//! A deterministic capability driven by a responder closure.
//!
//! Stands in for a hosted reasoning service. Usage is accounted the way a
//! metered service would bill it: tokens are estimated as one per four
//! characters (rounded up) and priced at a flat rate per thousand tokens.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use cohort_contracts::{
    capability::{PromptRequest, Reply, UsageStats},
    error::CohortResult,
};
use cohort_core::traits::Capability;

/// Default price in USD per thousand tokens, input and output alike.
pub const DEFAULT_COST_PER_1K_TOKENS: f64 = 0.002;

type Responder = Box<dyn Fn(&PromptRequest) -> CohortResult<String> + Send + Sync>;

pub struct ScriptedCapability {
    name: String,
    responder: Responder,
    cost_per_1k_tokens: f64,
    usage: Mutex<UsageStats>,
}

impl ScriptedCapability {
    pub fn new(
        name: impl Into<String>,
        responder: impl Fn(&PromptRequest) -> CohortResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            responder: Box::new(responder),
            cost_per_1k_tokens: DEFAULT_COST_PER_1K_TOKENS,
            usage: Mutex::new(UsageStats::default()),
        }
    }

    /// Replies with `{"echo": <instructions>}` for every request.
    pub fn echo(name: impl Into<String>) -> Self {
        Self::new(name, |request| Ok(json!({ "echo": request.instructions }).to_string()))
    }

    pub fn with_cost_per_1k_tokens(mut self, rate: f64) -> Self {
        self.cost_per_1k_tokens = rate;
        self
    }

    fn answer(&self, request: &PromptRequest) -> CohortResult<String> {
        let result = (self.responder)(request);

        let prompt_chars = request.instructions.chars().count()
            + request.attributes.chars().count()
            + request.append_message.as_deref().map_or(0, |m| m.chars().count());
        let input_tokens = estimate_tokens(prompt_chars);
        let output_tokens = match &result {
            Ok(payload) => estimate_tokens(payload.chars().count()),
            Err(_) => 0,
        };

        let mut usage = self.usage.lock().unwrap_or_else(PoisonError::into_inner);
        usage.calls += 1;
        usage.input_tokens += input_tokens;
        usage.output_tokens += output_tokens;
        usage.estimated_cost +=
            (input_tokens + output_tokens) as f64 / 1000.0 * self.cost_per_1k_tokens;

        debug!(
            capability = %self.name,
            input_tokens,
            output_tokens,
            ok = result.is_ok(),
            "scripted reply"
        );
        result
    }
}

/// One token per four characters, rounded up.
pub fn estimate_tokens(chars: usize) -> u64 {
    chars.div_ceil(4) as u64
}

#[async_trait]
impl Capability for ScriptedCapability {
    fn name(&self) -> &str {
        &self.name
    }

    async fn prompt(&self, request: &PromptRequest) -> CohortResult<Reply> {
        self.answer(request).map(Reply::new)
    }

    async fn prompt_thinking(&self, request: &PromptRequest) -> CohortResult<Reply> {
        let payload = self.answer(request)?;
        let reasoning = format!("{} applied: {}", self.name, request.instructions);
        Ok(Reply::with_reasoning(payload, reasoning))
    }

    fn create_schema(&self, sample: &Value) -> Value {
        cohort_schema::infer_schema(sample)
    }

    fn usage_stats(&self) -> UsageStats {
        *self.usage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset_usage_stats(&self) {
        *self.usage.lock().unwrap_or_else(PoisonError::into_inner) = UsageStats::default();
    }
}
