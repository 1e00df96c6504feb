//! Learning plan tools: save and list.

use crate::store::{LearningPlan, PlanStore};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use studymate_core::error::ToolError;
use studymate_core::tool::{InvocationMetadata, Tool};
use tracing::debug;

/// Persists a generated learning plan for the calling user.
pub struct SaveLearningPlanTool {
    store: Arc<dyn PlanStore>,
}

impl SaveLearningPlanTool {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SaveLearningPlanTool {
    fn name(&self) -> &str {
        "save_learning_plan"
    }

    fn description(&self) -> &str {
        "Save a learning plan you generated so the user can revisit it. \
         Use after producing a study plan the user wants to keep."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "The subject the plan covers"
                },
                "content": {
                    "type": "string",
                    "description": "The full plan text"
                }
            },
            "required": ["topic", "content"]
        })
    }

    async fn execute(
        &self,
        arguments: Value,
        meta: &InvocationMetadata,
    ) -> Result<String, ToolError> {
        let topic = arguments["topic"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'topic' must be a string".into()))?;
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'content' must be a string".into()))?;

        let plan = self
            .store
            .save(LearningPlan {
                id: String::new(),
                caller_id: meta.caller_id.clone(),
                topic: topic.to_string(),
                content: content.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        debug!(plan_id = %plan.id, caller = %meta.caller_id, "Saved learning plan");
        serde_json::to_string(&json!({ "id": plan.id, "topic": plan.topic }))
            .map_err(|e| ToolError::Store(format!("serialize plan: {e}")))
    }
}

/// Lists the calling user's saved learning plans.
pub struct ListLearningPlansTool {
    store: Arc<dyn PlanStore>,
}

impl ListLearningPlansTool {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListLearningPlansTool {
    fn name(&self) -> &str {
        "list_learning_plans"
    }

    fn description(&self) -> &str {
        "List the user's saved learning plans. Use when the user asks what \
         plans they have or wants to continue an earlier plan."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        _arguments: Value,
        meta: &InvocationMetadata,
    ) -> Result<String, ToolError> {
        let plans = self.store.list(&meta.caller_id).await?;
        serde_json::to_string(&json!({ "plans": plans, "count": plans.len() }))
            .map_err(|e| ToolError::Store(format!("serialize plans: {e}")))
    }
}
