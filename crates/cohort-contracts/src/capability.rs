//! Request, reply, and usage types for the reasoning capability boundary.
//!
//! The engine never looks inside a capability. It hands over a
//! [`PromptRequest`], receives a [`Reply`], and reads [`UsageStats`] back for
//! aggregation.

use std::ops::Add;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything a node sends to its capability for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// The node's instructions text.
    pub instructions: String,
    /// The agent's current attributes serialized as JSON text.
    pub attributes: String,
    /// Extra text appended after the instructions (e.g. a request to justify
    /// the change).
    pub append_message: Option<String>,
    /// The response schema the reply should conform to.
    pub schema: Option<Value>,
}

/// A capability's answer to one [`PromptRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// The structural payload as raw text. Expected to hold a JSON object.
    pub payload: String,
    /// Reasoning text. Only populated by `prompt_thinking`.
    pub reasoning: Option<String>,
}

impl Reply {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            reasoning: None,
        }
    }

    pub fn with_reasoning(payload: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            reasoning: Some(reasoning.into()),
        }
    }
}

/// Call and token counters kept by each capability instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Estimated spend in USD.
    pub estimated_cost: f64,
}

impl UsageStats {
    /// Fold `other` into `self`.
    pub fn accumulate(&mut self, other: &UsageStats) {
        self.calls += other.calls;
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.estimated_cost += other.estimated_cost;
    }

    pub fn is_zero(&self) -> bool {
        self.calls == 0
            && self.input_tokens == 0
            && self.output_tokens == 0
            && self.estimated_cost == 0.0
    }
}

impl Add for UsageStats {
    type Output = UsageStats;

    fn add(mut self, rhs: UsageStats) -> UsageStats {
        self.accumulate(&rhs);
        self
    }
}
