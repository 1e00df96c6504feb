//! Routing domain types — which agent handles a message, and why.

use serde::{Deserialize, Serialize};

/// Identifies one of the specialized agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    /// Study-plan generation and learning guidance
    Learning,
    /// Task and deadline management
    Task,
    /// Code help and debugging
    Code,
    /// App navigation and feature discovery
    Roadmap,
    /// Everything else — conceptual questions, small talk
    General,
}

impl AgentId {
    /// All agent ids, in registration order.
    pub const ALL: [AgentId; 5] = [
        AgentId::Learning,
        AgentId::Task,
        AgentId::Code,
        AgentId::Roadmap,
        AgentId::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Learning => "learning",
            AgentId::Task => "task",
            AgentId::Code => "code",
            AgentId::Roadmap => "roadmap",
            AgentId::General => "general",
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentId {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "learning" => Ok(AgentId::Learning),
            "task" => Ok(AgentId::Task),
            "code" => Ok(AgentId::Code),
            "roadmap" => Ok(AgentId::Roadmap),
            "general" => Ok(AgentId::General),
            other => Err(UnknownAgent(other.to_string())),
        }
    }
}

/// Error for agent-name parsing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown agent: {0}")]
pub struct UnknownAgent(pub String);

/// The outcome of intent classification. Produced once per request,
/// immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// The agent that should handle the message.
    pub agent: AgentId,

    /// Classifier confidence, always within [0, 1].
    pub confidence: f32,

    /// Human-readable rationale for the decision.
    pub reasoning: String,
}

impl RoutingDecision {
    /// Create a decision, clamping confidence into [0, 1].
    pub fn new(agent: AgentId, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            agent,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
        }
    }

    /// A heuristic-path decision (no LLM involved).
    pub fn heuristic(agent: AgentId) -> Self {
        Self::new(agent, 0.9, "heuristic match")
    }

    /// The degraded decision used when routing itself fails.
    pub fn fallback(reasoning: impl Into<String>, confidence: f32) -> Self {
        Self::new(AgentId::General, confidence, reasoning)
    }
}
