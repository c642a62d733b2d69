//! A single processing step: one capability call merged into one agent.
//!
//! Node execution is best-effort. A failed capability call leaves the agent
//! untouched and is reported as [`NodeOutcome::Skipped`]; it is never retried
//! and never surfaces as an error. A reply that cannot be turned into a change
//! set is still merged, as an error-marker change set, so the failure stays
//! visible in the agent's history.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use cohort_contracts::{
    agent::{Agent, Attributes},
    capability::PromptRequest,
    error::{CohortError, CohortResult},
    process::{NodeId, ProcessId},
};

use crate::traits::Capability;

/// Key of the error message in a marker change set.
pub const ERROR_MARKER_KEY: &str = "error";
/// Key of the unparsed reply text in a marker change set.
pub const RAW_RESPONSE_KEY: &str = "raw_response";
/// Key of the violation list when a reply breaks the node's explicit schema.
pub const SCHEMA_VIOLATIONS_KEY: &str = "schema_violations";

const REASONING_REQUEST: &str =
    "Also explain briefly why each attribute you return should change.";

/// What happened when a node ran for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    /// The reply parsed cleanly and its change set was merged.
    Applied,
    /// The reply was malformed; an error-marker change set was merged.
    Malformed,
    /// The capability call failed; the agent was not touched.
    Skipped { reason: String },
}

impl NodeOutcome {
    /// True if a history entry was appended.
    pub fn mutated(&self) -> bool {
        !matches!(self, NodeOutcome::Skipped { .. })
    }
}

/// One step of a process. Immutable after construction.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    capability: Arc<dyn Capability>,
    instructions: String,
    schema: Option<Value>,
    chain_of_thought: bool,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        capability: Arc<dyn Capability>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: NodeId::new(id),
            capability,
            instructions: instructions.into(),
            schema: None,
            chain_of_thought: false,
        }
    }

    /// Attach an explicit response schema. Replies that violate it are merged
    /// as error markers.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Request reasoning text alongside the change.
    pub fn with_chain_of_thought(mut self, enabled: bool) -> Self {
        self.chain_of_thought = enabled;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn capability(&self) -> &Arc<dyn Capability> {
        &self.capability
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    pub fn chain_of_thought(&self) -> bool {
        self.chain_of_thought
    }

    /// Run this node for `agent` outside of any process.
    pub async fn execute(&self, agent: &mut Agent) -> NodeOutcome {
        self.execute_within(agent, None).await
    }

    /// Run this node for `agent`, tagging the history entry with `process_id`.
    pub async fn execute_within(
        &self,
        agent: &mut Agent,
        process_id: Option<&ProcessId>,
    ) -> NodeOutcome {
        let request = self.build_request(agent);

        let result = if self.chain_of_thought {
            self.capability.prompt_thinking(&request).await
        } else {
            self.capability.prompt(&request).await
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    agent_id = %agent.id,
                    node_id = %self.id,
                    capability = %self.capability.name(),
                    error = %e,
                    "capability call failed, node skipped for agent"
                );
                return NodeOutcome::Skipped { reason: e.to_string() };
            }
        };

        let reasoning = if self.chain_of_thought { reply.reasoning } else { None };

        let (changes, outcome) = match parse_change_set(&reply.payload) {
            Ok(changes) => match self.schema_violations(&changes) {
                None => (changes, NodeOutcome::Applied),
                Some(violations) => {
                    warn!(
                        agent_id = %agent.id,
                        node_id = %self.id,
                        violations = violations.len(),
                        "reply violates node schema"
                    );
                    let mut marker = error_marker(
                        "reply does not match the node's response schema",
                        &reply.payload,
                    );
                    marker.insert(SCHEMA_VIOLATIONS_KEY.to_string(), json!(violations));
                    (marker, NodeOutcome::Malformed)
                }
            },
            Err(e) => {
                warn!(
                    agent_id = %agent.id,
                    node_id = %self.id,
                    error = %e,
                    "malformed capability reply recorded as error marker"
                );
                (error_marker(&e.to_string(), &reply.payload), NodeOutcome::Malformed)
            }
        };

        debug!(
            agent_id = %agent.id,
            node_id = %self.id,
            keys = changes.len(),
            "merging change set"
        );
        agent.apply_changes(self.id.clone(), process_id.cloned(), changes, reasoning);
        outcome
    }

    fn build_request(&self, agent: &Agent) -> PromptRequest {
        let attributes = Value::Object(agent.attributes.clone());
        let schema = match &self.schema {
            Some(schema) => schema.clone(),
            None => self.capability.create_schema(&attributes),
        };

        PromptRequest {
            instructions: self.instructions.clone(),
            attributes: attributes.to_string(),
            append_message: self.chain_of_thought.then(|| REASONING_REQUEST.to_string()),
            schema: Some(schema),
        }
    }

    fn schema_violations(&self, changes: &Attributes) -> Option<Vec<String>> {
        let schema = self.schema.as_ref()?;
        let violations = cohort_schema::check(&Value::Object(changes.clone()), schema);
        if violations.is_empty() {
            None
        } else {
            Some(cohort_schema::describe(&violations))
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("capability", &self.capability.name())
            .field("chain_of_thought", &self.chain_of_thought)
            .field("has_schema", &self.schema.is_some())
            .finish()
    }
}

/// Parse a reply payload into a change set.
///
/// Accepts a bare JSON object, or a JSON object inside the first fenced code
/// block of the text. Anything else is a `ResponseParse` error.
pub fn parse_change_set(raw: &str) -> CohortResult<Attributes> {
    let trimmed = raw.trim();
    let candidate = extract_fenced_block(trimmed).map(str::trim).unwrap_or(trimmed);

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(changes)) => Ok(changes),
        Ok(other) => Err(CohortError::ResponseParse {
            reason: format!("expected a JSON object, got {}", value_kind(&other)),
        }),
        Err(e) => Err(CohortError::ResponseParse {
            reason: format!("reply is not valid JSON: {e}"),
        }),
    }
}

/// Build the change set merged in place of an unparseable reply.
pub fn error_marker(reason: &str, raw: &str) -> Attributes {
    let mut marker = Attributes::new();
    marker.insert(ERROR_MARKER_KEY.to_string(), json!(reason));
    marker.insert(RAW_RESPONSE_KEY.to_string(), json!(raw));
    marker
}

/// Body of the first ``` fenced block, skipping the language tag line.
fn extract_fenced_block(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];
    let body_start = fence_start + 3 + after_opening.find('\n')? + 1;
    let body_len = content[body_start..].find("```")?;
    if body_len == 0 {
        return None;
    }
    Some(&content[body_start..body_start + body_len])
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
