//! The code agent: debugging help, code review, programming concepts.

use crate::base::{Agent, TurnContext, run_turn};
use async_trait::async_trait;
use std::sync::Arc;
use studymate_core::tool::ToolRegistry;
use studymate_core::{AgentId, AgentResponse, ReasoningBackend};

const INSTRUCTION: &str = "You are StudyMate's programming tutor. You help the user debug \
errors, review code, and understand programming concepts. When shown an error, explain what \
it means before proposing a fix, and prefer the smallest change that resolves it. Use short \
code snippets, and point out the line that matters. Never invent APIs; say so when you are \
unsure a function exists.";

pub struct CodeAgent {
    backend: Arc<dyn ReasoningBackend>,
    tools: Arc<ToolRegistry>,
}

impl CodeAgent {
    pub fn new(backend: Arc<dyn ReasoningBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self { backend, tools }
    }
}

#[async_trait]
impl Agent for CodeAgent {
    fn id(&self) -> AgentId {
        AgentId::Code
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
