//! Ownership of every registered agent.

use std::collections::{BTreeMap, BTreeSet};

use cohort_contracts::{
    agent::{Agent, AgentId, Attributes},
    error::{CohortError, CohortResult},
};

/// Maps agent ids to agent state. Agents are never removed during a run.
#[derive(Debug, Default)]
pub struct AgentStore {
    agents: BTreeMap<AgentId, Agent>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new agent with its starting attributes.
    pub fn register(&mut self, id: impl Into<AgentId>, attributes: Attributes) -> CohortResult<()> {
        self.insert(Agent::new(id, attributes))
    }

    /// Register an already-built agent (history included).
    pub fn insert(&mut self, agent: Agent) -> CohortResult<()> {
        if self.agents.contains_key(&agent.id) {
            return Err(CohortError::DuplicateAgent { agent_id: agent.id.0.clone() });
        }
        self.agents.insert(agent.id.clone(), agent);
        Ok(())
    }

    pub fn get(&self, id: &AgentId) -> CohortResult<&Agent> {
        self.agents
            .get(id)
            .ok_or_else(|| CohortError::NotFound { agent_id: id.0.clone() })
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    /// All agents, ordered by id.
    pub fn list(&self) -> Vec<&Agent> {
        self.agents.values().collect()
    }

    pub fn ids(&self) -> BTreeSet<AgentId> {
        self.agents.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Disjoint mutable borrows of the agents named in `ids`, ordered by id.
    /// Unknown ids are ignored.
    pub fn select_mut(&mut self, ids: &BTreeSet<AgentId>) -> Vec<&mut Agent> {
        self.agents
            .iter_mut()
            .filter(|(id, _)| ids.contains(*id))
            .map(|(_, agent)| agent)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use cohort_contracts::{agent::AgentId, error::CohortError};

    use super::AgentStore;
    use crate::testing::attrs;

    #[test]
    fn test_register_and_get() {
        let mut store = AgentStore::new();
        store.register("a", attrs(json!({ "x": 1 }))).unwrap();

        let agent = store.get(&AgentId::from("a")).unwrap();
        assert_eq!(agent.attributes["x"], json!(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut store = AgentStore::new();
        store.register("a", attrs(json!({}))).unwrap();

        match store.register("a", attrs(json!({}))) {
            Err(CohortError::DuplicateAgent { agent_id }) => assert_eq!(agent_id, "a"),
            other => panic!("expected DuplicateAgent, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let store = AgentStore::new();
        match store.get(&AgentId::from("ghost")) {
            Err(CohortError::NotFound { agent_id }) => assert_eq!(agent_id, "ghost"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_select_mut_returns_only_requested_agents() {
        let mut store = AgentStore::new();
        for id in ["c", "a", "b"] {
            store.register(id, attrs(json!({}))).unwrap();
        }

        let wanted: BTreeSet<AgentId> =
            [AgentId::from("c"), AgentId::from("a"), AgentId::from("zzz")].into_iter().collect();
        let selected = store.select_mut(&wanted);

        let ids: Vec<&str> = selected.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let mut store = AgentStore::new();
        store.register("b", attrs(json!({}))).unwrap();
        store.register("a", attrs(json!({}))).unwrap();

        let ids: Vec<&str> = store.list().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
