//! The learning agent: builds study plans and tracks learning goals.

use crate::base::{Agent, TurnContext, run_turn};
use async_trait::async_trait;
use std::sync::Arc;
use studymate_core::tool::ToolRegistry;
use studymate_core::{AgentId, AgentResponse, ReasoningBackend};
use studymate_tools::PLAN_TOOLS;

const INSTRUCTION: &str = "You are StudyMate's learning coach. You help the user design \
realistic study plans: break a topic into ordered milestones with time estimates, suggest \
resources, and adjust plans when the user reports progress or setbacks. When the user asks \
you to create or save a plan, use the save_learning_plan tool; when they ask what plans they \
have, use list_learning_plans. Keep plans concrete: weekly goals, not vague encouragement.";

pub struct LearningAgent {
    backend: Arc<dyn ReasoningBackend>,
    tools: Arc<ToolRegistry>,
}

impl LearningAgent {
    pub fn new(backend: Arc<dyn ReasoningBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self { backend, tools }
    }
}

#[async_trait]
impl Agent for LearningAgent {
    fn id(&self) -> AgentId {
        AgentId::Learning
    }

    async fn process(&self, message: &str, ctx: &TurnContext) -> AgentResponse {
        run_turn(
            self.id(),
            INSTRUCTION,
            &PLAN_TOOLS,
            &self.backend,
            &self.tools,
            message,
            ctx,
        )
        .await
    }
}
