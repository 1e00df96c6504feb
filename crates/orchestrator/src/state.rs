//! Pipeline state and the patch reconciliation rule.
//!
//! Each pipeline node returns a [`StatePatch`], not a whole state.
//! Reconciliation is replace-if-present for every field except
//! `context`, which merges key-by-key with the patch winning on
//! conflicts. That merge is what carries caller identity and
//! personalization introduced before routing into the process stage
//! untouched.

use studymate_core::{AgentId, AgentResponse, ChatMessage, RequestContext, RoutingDecision};

/// The full state threaded through one request's pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Conversation history plus the current user message.
    pub messages: Vec<ChatMessage>,

    /// The agent chosen by the route node.
    pub current_agent: Option<AgentId>,

    /// The route node's full decision.
    pub routing: Option<RoutingDecision>,

    /// The process node's output.
    pub response: Option<AgentResponse>,

    /// Response language (ISO 639-1).
    pub language: String,

    /// Per-request context bag.
    pub context: RequestContext,
}

impl PipelineState {
    /// Apply a partial update.
    pub fn apply(&mut self, patch: StatePatch) {
        if let Some(messages) = patch.messages {
            self.messages = messages;
        }
        if let Some(agent) = patch.current_agent {
            self.current_agent = Some(agent);
        }
        if let Some(routing) = patch.routing {
            self.routing = Some(routing);
        }
        if let Some(response) = patch.response {
            self.response = Some(response);
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(context) = patch.context {
            self.context.merge(&context);
        }
    }
}

/// A partial state update produced by one pipeline node.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub messages: Option<Vec<ChatMessage>>,
    pub current_agent: Option<AgentId>,
    pub routing: Option<RoutingDecision>,
    pub response: Option<AgentResponse>,
    pub language: Option<String>,
    pub context: Option<RequestContext>,
}

impl StatePatch {
    /// The route node's output.
    pub fn routed(decision: RoutingDecision) -> Self {
        Self {
            current_agent: Some(decision.agent),
            routing: Some(decision),
            ..Self::default()
        }
    }

    /// The process node's output.
    pub fn responded(response: AgentResponse) -> Self {
        Self {
            response: Some(response),
            ..Self::default()
        }
    }
}
