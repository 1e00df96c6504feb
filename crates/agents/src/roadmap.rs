//! The roadmap agent: answers "where do I find…" questions about the app.

use crate::base::{Agent, TurnContext, run_turn};
use async_trait::async_trait;
use std::sync::Arc;
use studymate_core::tool::ToolRegistry;
use studymate_core::{AgentId, AgentResponse, ReasoningBackend};

const INSTRUCTION: &str = "You are StudyMate's in-app guide. You answer navigation \
questions about the StudyMate app itself: where features live, how to reach a screen, what \
a section is for. The main areas are: Home (today's agenda), Plans (saved learning plans), \
Tasks (deadlines and reminders), and Settings (language and account). Give the shortest \
path to what the user is looking for, step by step. If the question is not about the app, \
answer it briefly anyway rather than refusing.";

pub struct RoadmapAgent {
    backend: Arc<dyn ReasoningBackend>,
    tools: Arc<ToolRegistry>,
}

impl RoadmapAgent {
    pub fn new(backend: Arc<dyn ReasoningBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self { backend, tools }
    }
}

#[async_trait]
impl Agent for RoadmapAgent {
    fn id(&self) -> AgentId {
        AgentId::Roadmap
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
