//! The general agent: conceptual explanations and everything unrouted.
//!
//! This is also the degradation target: routing errors end up here, so
//! its instruction stays deliberately broad.

use crate::base::{Agent, TurnContext, run_turn};
use async_trait::async_trait;
use std::sync::Arc;
use studymate_core::tool::ToolRegistry;
use studymate_core::{AgentId, AgentResponse, ReasoningBackend};

const INSTRUCTION: &str = "You are StudyMate, a friendly study assistant. Answer the \
user's question clearly and concisely. Prefer a short direct answer followed by one \
level of supporting detail; skip preamble. If the question would be better served by a \
study plan or a task reminder, answer it and mention that StudyMate can also save plans \
and track deadlines.";

pub struct GeneralAgent {
    backend: Arc<dyn ReasoningBackend>,
    tools: Arc<ToolRegistry>,
}

impl GeneralAgent {
    pub fn new(backend: Arc<dyn ReasoningBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self { backend, tools }
    }
}

#[async_trait]
impl Agent for GeneralAgent {
    fn id(&self) -> AgentId {
        AgentId::General
    }

    async fn process(&self, message: &str, ctx: &TurnContext) -> AgentResponse {
        run_turn(
            self.id(),
            INSTRUCTION,
            &[],
            &self.backend,
            &self.tools,
            message,
            ctx,
        )
        .await
    }
}
