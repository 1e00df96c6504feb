//! Store traits for the external persistence collaborator, plus an
//! in-memory reference implementation.
//!
//! The orchestration core never talks to storage directly; tools do,
//! and always scoped by the caller id from `InvocationMetadata`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studymate_core::error::ToolError;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A task/deadline record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub caller_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A saved learning plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPlan {
    pub id: String,
    pub caller_id: String,
    pub topic: String,
    /// Free-form plan body as produced by the learning agent.
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for task records, scoped per caller.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: TaskRecord) -> Result<TaskRecord, ToolError>;
    async fn list(&self, caller_id: &str) -> Result<Vec<TaskRecord>, ToolError>;
    async fn complete(&self, caller_id: &str, task_id: &str) -> Result<TaskRecord, ToolError>;
}

/// Persistence for learning plans, scoped per caller.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn save(&self, plan: LearningPlan) -> Result<LearningPlan, ToolError>;
    async fn list(&self, caller_id: &str) -> Result<Vec<LearningPlan>, ToolError>;
}

/// In-memory store — the reference implementation for tests and
/// ephemeral sessions.
pub struct InMemoryStore {
    tasks: RwLock<Vec<TaskRecord>>,
    plans: RwLock<Vec<LearningPlan>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
            plans: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn create(&self, mut task: TaskRecord) -> Result<TaskRecord, ToolError> {
        if task.id.is_empty() {
            task.id = Uuid::new_v4().to_string();
        }
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn list(&self, caller_id: &str) -> Result<Vec<TaskRecord>, ToolError> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .filter(|t| t.caller_id == caller_id)
            .cloned()
            .collect())
    }

    async fn complete(&self, caller_id: &str, task_id: &str) -> Result<TaskRecord, ToolError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.caller_id == caller_id && t.id == task_id)
            .ok_or_else(|| ToolError::Store(format!("task not found: {task_id}")))?;
        task.completed = true;
        Ok(task.clone())
    }
}

#[async_trait]
impl PlanStore for InMemoryStore {
    async fn save(&self, mut plan: LearningPlan) -> Result<LearningPlan, ToolError> {
        if plan.id.is_empty() {
            plan.id = Uuid::new_v4().to_string();
        }
        self.plans.write().await.push(plan.clone());
        Ok(plan)
    }

    async fn list(&self, caller_id: &str) -> Result<Vec<LearningPlan>, ToolError> {
        let plans = self.plans.read().await;
        Ok(plans
            .iter()
            .filter(|p| p.caller_id == caller_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(caller: &str, title: &str) -> TaskRecord {
        TaskRecord {
            id: String::new(),
            caller_id: caller.into(),
            title: title.into(),
            due_date: None,
            completed: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id() {
        let store = InMemoryStore::new();
        let created = store.create(task("u1", "Read chapter 3")).await.unwrap();
        assert!(!created.id.is_empty());
    }

    #[tokio::test]
    async fn list_is_scoped_by_caller() {
        let store = InMemoryStore::new();
        store.create(task("u1", "mine")).await.unwrap();
        store.create(task("u2", "theirs")).await.unwrap();

        let mine = TaskStore::list(&store, "u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }

    #[tokio::test]
    async fn complete_marks_task() {
        let store = InMemoryStore::new();
        let created = store.create(task("u1", "finish")).await.unwrap();
        let done = store.complete("u1", &created.id).await.unwrap();
        assert!(done.completed);
    }

    #[tokio::test]
    async fn complete_wrong_caller_fails() {
        let store = InMemoryStore::new();
        let created = store.create(task("u1", "private")).await.unwrap();
        let err = store.complete("u2", &created.id).await.unwrap_err();
        assert!(matches!(err, ToolError::Store(_)));
    }

    #[tokio::test]
    async fn plans_roundtrip() {
        let store = InMemoryStore::new();
        let saved = store
            .save(LearningPlan {
                id: String::new(),
                caller_id: "u1".into(),
                topic: "Rust".into(),
                content: "Week 1: ownership".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        assert!(!saved.id.is_empty());

        let plans = PlanStore::list(&store, "u1").await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].topic, "Rust");
    }
}
