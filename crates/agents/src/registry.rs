//! The AgentId -> Agent mapping the orchestrator selects from.

use crate::base::Agent;
use crate::code::CodeAgent;
use crate::general::GeneralAgent;
use crate::learning::LearningAgent;
use crate::roadmap::RoadmapAgent;
use crate::task::TaskAgent;
use std::collections::HashMap;
use std::sync::Arc;
use studymate_core::tool::ToolRegistry;
use studymate_core::{AgentId, Profile, ReasoningBackend};

/// Read-only after startup; safe for concurrent lookups.
pub struct AgentRegistry {
    agents: HashMap<AgentId, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent under its own id. Replaces any previous
    /// registration for that id.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.id(), agent);
    }

    pub fn get(&self, id: AgentId) -> Option<&Arc<dyn Agent>> {
        self.agents.get(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the standard five-agent registry.
///
/// `backend_for` maps each generation profile to a pooled backend
/// handle, so every agent shares the pool slots instead of owning a
/// connection.
pub fn default_agents(
    backend_for: impl Fn(Profile) -> Arc<dyn ReasoningBackend>,
    tools: Arc<ToolRegistry>,
) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.register(Arc::new(LearningAgent::new(
        backend_for(Profile::Creative),
        tools.clone(),
    )));
    registry.register(Arc::new(TaskAgent::new(
        backend_for(Profile::Fast),
        tools.clone(),
    )));
    registry.register(Arc::new(CodeAgent::new(
        backend_for(Profile::Precise),
        tools.clone(),
    )));
    registry.register(Arc::new(RoadmapAgent::new(
        backend_for(Profile::Fast),
        tools.clone(),
    )));
    registry.register(Arc::new(GeneralAgent::new(backend_for(Profile::Fast), tools)));
    registry
}
