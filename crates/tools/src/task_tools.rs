//! Task management tools: create, list, complete.

use crate::store::{TaskRecord, TaskStore};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use studymate_core::error::ToolError;
use studymate_core::tool::{InvocationMetadata, Tool};
use tracing::debug;

/// Creates a task for the calling user.
pub struct CreateTaskTool {
    store: Arc<dyn TaskStore>,
}

impl CreateTaskTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreateTaskTool {
    fn name(&self) -> &str {
        "create_task"
    }

    fn description(&self) -> &str {
        "Create a task or reminder for the user. Use when the user asks to \
         remember something, add a task, or set a deadline."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Short description of the task"
                },
                "due_date": {
                    "type": "string",
                    "description": "Due date in YYYY-MM-DD format, if the user gave one"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(
        &self,
        arguments: Value,
        meta: &InvocationMetadata,
    ) -> Result<String, ToolError> {
        let title = arguments["title"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'title' must be a string".into()))?;

        let task = self
            .store
            .create(TaskRecord {
                id: String::new(),
                caller_id: meta.caller_id.clone(),
                title: title.to_string(),
                due_date: arguments["due_date"].as_str().map(String::from),
                completed: false,
                created_at: Utc::now(),
            })
            .await?;

        debug!(task_id = %task.id, caller = %meta.caller_id, "Created task");
        serde_json::to_string(&task)
            .map_err(|e| ToolError::Store(format!("serialize task: {e}")))
    }
}

/// Lists the calling user's tasks.
pub struct ListTasksTool {
    store: Arc<dyn TaskStore>,
}

impl ListTasksTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "List the user's tasks. Use when the user asks what is pending, \
         what is due, or wants an overview of their tasks."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "include_completed": {
                    "type": "boolean",
                    "description": "Whether to include completed tasks (default false)"
                }
            }
        })
    }

    async fn execute(
        &self,
        arguments: Value,
        meta: &InvocationMetadata,
    ) -> Result<String, ToolError> {
        let include_completed = arguments["include_completed"].as_bool().unwrap_or(false);

        let mut tasks = self.store.list(&meta.caller_id).await?;
        if !include_completed {
            tasks.retain(|t| !t.completed);
        }

        serde_json::to_string(&json!({ "tasks": tasks, "count": tasks.len() }))
            .map_err(|e| ToolError::Store(format!("serialize tasks: {e}")))
    }
}

/// Marks one of the calling user's tasks as completed.
pub struct CompleteTaskTool {
    store: Arc<dyn TaskStore>,
}

impl CompleteTaskTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CompleteTaskTool {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn description(&self) -> &str {
        "Mark a task as completed. Use after list_tasks when the user says \
         they finished something; pass the task's id."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The id of the task to complete"
                }
            },
            "required": ["task_id"]
        })
    }

    async fn execute(
        &self,
        arguments: Value,
        meta: &InvocationMetadata,
    ) -> Result<String, ToolError> {
        let task_id = arguments["task_id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'task_id' must be a string".into()))?;

        let task = self.store.complete(&meta.caller_id, task_id).await?;
        serde_json::to_string(&task)
            .map_err(|e| ToolError::Store(format!("serialize task: {e}")))
    }
}
