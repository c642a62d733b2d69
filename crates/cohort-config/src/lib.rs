//! # cohort-config
//!
//! TOML-driven engine settings and declarative process definitions.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use cohort_config::{CapabilityRegistry, CohortConfig};
//!
//! let config = CohortConfig::from_file(Path::new("screening.toml"))?;
//! let registry = CapabilityRegistry::new().with("oracle", capability);
//! let mut orchestrator = config.build_orchestrator()?;
//! let report = orchestrator.run_to_completion(config.build_process(&registry)?).await;
//! ```
//!
//! ## Branch conditions
//!
//! Conditional processes carry a [`Condition`] tree instead of a closure, so
//! the whole process can live in a file.

pub mod condition;
pub mod definition;
pub mod loader;

pub use condition::Condition;
pub use definition::{AgentDefinition, BranchDefinition, CohortConfig, NodeDefinition, ProcessDefinition};
pub use loader::CapabilityRegistry;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use cohort_contracts::{
        agent::AgentId,
        capability::{PromptRequest, Reply, UsageStats},
        error::{CohortError, CohortResult},
    };
    use cohort_core::{process::Process, traits::Capability};

    use crate::{CapabilityRegistry, CohortConfig, ProcessDefinition};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Replies with a fixed change set and counts calls.
    struct StubCapability {
        reply: String,
        usage: Mutex<UsageStats>,
    }

    impl StubCapability {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: reply.to_string(), usage: Mutex::new(UsageStats::default()) })
        }
    }

    #[async_trait]
    impl Capability for StubCapability {
        fn name(&self) -> &str {
            "stub"
        }

        async fn prompt(&self, _request: &PromptRequest) -> CohortResult<Reply> {
            self.usage.lock().unwrap().calls += 1;
            Ok(Reply::new(self.reply.clone()))
        }

        async fn prompt_thinking(&self, request: &PromptRequest) -> CohortResult<Reply> {
            let reply = self.prompt(request).await?;
            Ok(Reply::with_reasoning(reply.payload, "stub reasoning"))
        }

        fn create_schema(&self, _sample: &Value) -> Value {
            Value::Null
        }

        fn usage_stats(&self) -> UsageStats {
            *self.usage.lock().unwrap()
        }

        fn reset_usage_stats(&self) {
            *self.usage.lock().unwrap() = UsageStats::default();
        }
    }

    const SCREENING: &str = r#"
        [engine]
        max_concurrency = 2
        step_pause_ms = 0

        [process]
        kind = "conditional"
        id = "screening"

        [[process.nodes]]
        id = "measure"
        capability = "oracle"
        instructions = "Record the agent's measured height."

        [process.condition]
        kind = "in_range"
        path = "height"
        min = 150
        max = 200

        [process.if_true]
        id = "tall-track"

        [[process.if_true.nodes]]
        id = "t1"
        capability = "oracle"
        instructions = "First tall-track question."
        chain_of_thought = true

        [[process.if_true.nodes]]
        id = "t2"
        capability = "oracle"
        instructions = "Second tall-track question."

        [process.if_false]
        id = "short-track"

        [[process.if_false.nodes]]
        id = "f1"
        capability = "oracle"
        instructions = "Short-track question."
        schema = { type = "object" }

        [[agents]]
        id = "A"
        attributes = { height = 160 }

        [[agents]]
        id = "B"
        attributes = { height = 100 }
    "#;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new().with("oracle", StubCapability::new(r#"{"seen": true}"#))
    }

    // ── 1. parsing ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_conditional_definition() {
        let config = CohortConfig::from_toml_str(SCREENING).unwrap();

        assert_eq!(config.engine.max_concurrency, 2);
        assert_eq!(config.engine.timeout_ms, 30_000, "unset fields keep defaults");
        assert_eq!(config.process.id(), "screening");
        assert_eq!(config.process.nodes().len(), 4);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[0].attributes["height"], json!(160));
        assert_eq!(config.capability_names(), vec!["oracle"]);

        match &config.process {
            ProcessDefinition::Conditional { if_true, if_false, .. } => {
                assert!(if_true.nodes[0].chain_of_thought);
                assert_eq!(if_false.nodes[0].schema, Some(json!({ "type": "object" })));
            }
            other => panic!("expected conditional definition, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_table_is_optional() {
        let config = CohortConfig::from_toml_str(
            r#"
            [process]
            kind = "linear"
            id = "empty"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.max_concurrency, 10);
        assert_eq!(config.engine.step_pause_ms, 100);
        assert!(config.agents.is_empty());
        assert!(config.process.nodes().is_empty());
    }

    // ── 2. errors ─────────────────────────────────────────────────────────────

    #[test]
    fn test_toml_parse_error() {
        match CohortConfig::from_toml_str("this is not valid toml ][[[") {
            Err(CohortError::Config { reason }) => {
                assert!(reason.contains("failed to parse process TOML"), "got: {reason}");
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let toml = r#"
            [engine]
            max_concurrency = 0

            [process]
            kind = "linear"
            id = "p"
        "#;
        assert!(matches!(CohortConfig::from_toml_str(toml), Err(CohortError::Config { .. })));
    }

    #[test]
    fn test_unknown_capability_fails_build() {
        let config = CohortConfig::from_toml_str(SCREENING).unwrap();
        let empty = CapabilityRegistry::new();

        match config.build_process(&empty) {
            Err(CohortError::Config { reason }) => {
                assert!(reason.contains("unknown capability 'oracle'"), "got: {reason}");
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = CohortConfig::from_file(Path::new("/nonexistent/cohort.toml"));
        match result {
            Err(CohortError::Config { reason }) => assert!(reason.contains("failed to read")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    // ── 3. building ───────────────────────────────────────────────────────────

    #[test]
    fn test_build_linear_process() {
        let config = CohortConfig::from_toml_str(
            r#"
            [process]
            kind = "linear"
            id = "survey"
            options = { retries = 2, timeout_ms = 5000 }

            [[process.nodes]]
            id = "n1"
            capability = "oracle"
            instructions = "one"

            [[process.nodes]]
            id = "n2"
            capability = "oracle"
            instructions = "two"
            "#,
        )
        .unwrap();

        match config.build_process(&registry()).unwrap() {
            Process::Linear(process) => {
                assert_eq!(process.len(), 2);
                assert_eq!(process.nodes()[1].instructions(), "two");
                assert_eq!(process.options().retries, 2);
                assert_eq!(process.options().timeout_ms, Some(5000));
            }
            other => panic!("expected linear process, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_options_reach_prefix() {
        let toml = SCREENING.replace(
            r#"id = "screening""#,
            "id = \"screening\"\n        options = { retries = 4, timeout_ms = 2500 }",
        );
        let config = CohortConfig::from_toml_str(&toml).unwrap();

        match config.build_process(&registry()).unwrap() {
            Process::Conditional(process) => {
                assert_eq!(process.options().retries, 4);
                assert_eq!(process.prefix().options().timeout_ms, Some(2500));
                assert_eq!(process.true_branch().options().retries, 0, "branches keep their own");
            }
            other => panic!("expected conditional process, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_definition_runs_end_to_end() {
        let config = CohortConfig::from_toml_str(SCREENING).unwrap();
        let mut orchestrator = config.build_orchestrator().unwrap();
        let process = config.build_process(&registry()).unwrap();

        let report = orchestrator.run_to_completion(process).await;

        assert_eq!(report.steps, 3);
        assert_eq!(report.usage.calls, 5);
        let a = orchestrator.get_agent(&AgentId::from("A")).unwrap();
        let b = orchestrator.get_agent(&AgentId::from("B")).unwrap();
        let a_nodes: Vec<&str> = a.history.iter().map(|e| e.node_id.0.as_str()).collect();
        let b_nodes: Vec<&str> = b.history.iter().map(|e| e.node_id.0.as_str()).collect();
        assert_eq!(a_nodes, vec!["measure", "t1", "t2"]);
        assert_eq!(b_nodes, vec!["measure", "f1"]);
        assert_eq!(a.history[1].reasoning.as_deref(), Some("stub reasoning"));
    }
}
