//! Test doubles shared by the engine's unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use cohort_contracts::{
    agent::Attributes,
    capability::{PromptRequest, Reply, UsageStats},
    error::{CohortError, CohortResult},
};

use crate::traits::Capability;

type Responder = Box<dyn Fn(&PromptRequest) -> CohortResult<String> + Send + Sync>;

/// A capability whose replies come from a closure, recording every request.
pub(crate) struct MockCapability {
    name: String,
    responder: Responder,
    requests: Mutex<Vec<PromptRequest>>,
    thinking_calls: Mutex<u64>,
    usage: Mutex<UsageStats>,
}

impl MockCapability {
    pub(crate) fn responder(
        f: impl Fn(&PromptRequest) -> CohortResult<String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: "mock".to_string(),
            responder: Box::new(f),
            requests: Mutex::new(Vec::new()),
            thinking_calls: Mutex::new(0),
            usage: Mutex::new(UsageStats::default()),
        })
    }

    /// Always replies with `payload`.
    pub(crate) fn constant(payload: &str) -> Arc<Self> {
        let payload = payload.to_string();
        Self::responder(move |_| Ok(payload.clone()))
    }

    /// Always fails with a `CapabilityCall` error.
    pub(crate) fn failing(reason: &str) -> Arc<Self> {
        let reason = reason.to_string();
        Self::responder(move |_| Err(CohortError::CapabilityCall { reason: reason.clone() }))
    }

    pub(crate) fn named(name: &str) -> Arc<Self> {
        let mut inner = Self::responder(|_| Ok("{}".to_string()));
        if let Some(capability) = Arc::get_mut(&mut inner) {
            capability.name = name.to_string();
        }
        inner
    }

    pub(crate) fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn thinking_calls(&self) -> u64 {
        *self.thinking_calls.lock().unwrap()
    }

    fn answer(&self, request: &PromptRequest) -> CohortResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        let result = (self.responder)(request);

        let mut usage = self.usage.lock().unwrap();
        usage.calls += 1;
        usage.input_tokens += (request.instructions.len() + request.attributes.len()) as u64;
        if let Ok(payload) = &result {
            usage.output_tokens += payload.len() as u64;
            usage.estimated_cost += 0.001;
        }
        result
    }
}

#[async_trait]
impl Capability for MockCapability {
    fn name(&self) -> &str {
        &self.name
    }

    async fn prompt(&self, request: &PromptRequest) -> CohortResult<Reply> {
        self.answer(request).map(Reply::new)
    }

    async fn prompt_thinking(&self, request: &PromptRequest) -> CohortResult<Reply> {
        *self.thinking_calls.lock().unwrap() += 1;
        self.answer(request)
            .map(|payload| Reply::with_reasoning(payload, "mock reasoning"))
    }

    fn create_schema(&self, sample: &Value) -> Value {
        cohort_schema::infer_schema(sample)
    }

    fn usage_stats(&self) -> UsageStats {
        *self.usage.lock().unwrap()
    }

    fn reset_usage_stats(&self) {
        *self.usage.lock().unwrap() = UsageStats::default();
    }
}

/// Unwrap a `json!` object literal into an attribute map.
pub(crate) fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Read an integer attribute out of serialized request attributes.
pub(crate) fn request_attr_i64(request: &PromptRequest, key: &str) -> Option<i64> {
    let value: Value = serde_json::from_str(&request.attributes).ok()?;
    value.get(key)?.as_i64()
}
