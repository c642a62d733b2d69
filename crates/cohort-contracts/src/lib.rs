//! # cohort-contracts
//!
//! Shared types, configuration, and error contracts for the cohort process
//! engine.
//!
//! Every crate in the workspace imports from here. No engine logic lives in
//! this crate, only data definitions, the attribute merge rule, and errors.

pub mod agent;
pub mod capability;
pub mod config;
pub mod error;
pub mod process;

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::*;
    use agent::{Agent, AgentId};
    use capability::UsageStats;
    use config::EngineConfig;
    use error::CohortError;
    use process::{NodeId, ProcessId, RunId};

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    // ── Agent ────────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_changes_merges_and_records_history() {
        let mut agent = Agent::new("a-1", attrs(json!({ "name": "Ada", "age": 30 })));

        agent.apply_changes(
            NodeId::new("birthday"),
            Some(ProcessId::new("life")),
            attrs(json!({ "age": 31, "mood": "happy" })),
            Some("one year passed".to_string()),
        );

        // Overwritten, added, and untouched keys.
        assert_eq!(agent.attributes["age"], json!(31));
        assert_eq!(agent.attributes["mood"], json!("happy"));
        assert_eq!(agent.attributes["name"], json!("Ada"));

        assert_eq!(agent.history.len(), 1);
        let entry = &agent.history[0];
        assert_eq!(entry.node_id, NodeId::new("birthday"));
        assert_eq!(entry.process_id, Some(ProcessId::new("life")));
        assert_eq!(entry.reasoning.as_deref(), Some("one year passed"));
    }

    #[test]
    fn test_replay_reproduces_current_attributes() {
        let mut agent = Agent::new("a-2", attrs(json!({ "score": 1 })));
        agent.apply_changes(NodeId::new("n1"), None, attrs(json!({ "score": 2 })), None);
        agent.apply_changes(NodeId::new("n2"), None, attrs(json!({ "tag": "x" })), None);
        agent.apply_changes(NodeId::new("n3"), None, attrs(json!({ "score": 5 })), None);

        assert_eq!(agent.replay(), agent.attributes);
        // Registration-time attributes are never touched.
        assert_eq!(agent.initial_attributes["score"], json!(1));
    }

    #[test]
    fn test_empty_change_set_still_appends_history() {
        let mut agent = Agent::new("a-3", Map::new());
        agent.apply_changes(NodeId::new("noop"), None, Map::new(), None);
        assert_eq!(agent.history.len(), 1);
        assert!(agent.attributes.is_empty());
    }

    #[test]
    fn test_agent_id_display_and_ordering() {
        let a = AgentId::from("alpha");
        let b = AgentId::from("beta".to_string());
        assert_eq!(a.to_string(), "alpha");
        assert!(a < b);
    }

    // ── UsageStats ───────────────────────────────────────────────────────────

    #[test]
    fn test_usage_stats_accumulate_and_add() {
        let a = UsageStats { calls: 2, input_tokens: 10, output_tokens: 4, estimated_cost: 0.5 };
        let b = UsageStats { calls: 1, input_tokens: 3, output_tokens: 1, estimated_cost: 0.25 };

        let sum = a + b;
        assert_eq!(sum.calls, 3);
        assert_eq!(sum.input_tokens, 13);
        assert_eq!(sum.output_tokens, 5);
        assert!((sum.estimated_cost - 0.75).abs() < f64::EPSILON);
        assert!(UsageStats::default().is_zero());
        assert!(!sum.is_zero());
    }

    // ── EngineConfig ─────────────────────────────────────────────────────────

    #[test]
    fn test_engine_config_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_concurrency, 10);
    }

    #[test]
    fn test_engine_config_rejects_zero_concurrency() {
        let config = EngineConfig { max_concurrency: 0, ..EngineConfig::default() };
        match config.validate() {
            Err(CohortError::Config { reason }) => assert!(reason.contains("max_concurrency")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_config_fills_missing_fields_from_defaults() {
        let config: EngineConfig = serde_json::from_value(json!({ "max_concurrency": 3 })).unwrap();
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.step_pause_ms, EngineConfig::default().step_pause_ms);
    }

    // ── Identifiers ──────────────────────────────────────────────────────────

    #[test]
    fn test_run_id_new_produces_unique_values() {
        let ids: std::collections::HashSet<String> =
            (0..50).map(|_| RunId::new().to_string()).collect();
        assert_eq!(ids.len(), 50);
    }

    // ── CohortError display messages ─────────────────────────────────────────

    #[test]
    fn test_error_not_found_display() {
        let err = CohortError::NotFound { agent_id: "ghost".to_string() };
        assert_eq!(err.to_string(), "agent 'ghost' not found");
    }

    #[test]
    fn test_error_capability_call_display() {
        let err = CohortError::CapabilityCall { reason: "connection reset".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("capability call failed"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_error_invalid_state_display() {
        let err = CohortError::InvalidState { reason: "run in progress".to_string() };
        assert!(err.to_string().contains("run in progress"));
    }
}
