//! Domain tool implementations for StudyMate.
//!
//! Tools are the only path to the persistence collaborator: they
//! receive the caller identity through `InvocationMetadata` and return
//! serialized JSON payloads the reasoning backend can read back to the
//! user. The stores are traits; the in-memory implementation here is
//! the reference used by tests and the CLI.

pub mod plan_tools;
pub mod store;
pub mod task_tools;

pub use store::{InMemoryStore, LearningPlan, PlanStore, TaskRecord, TaskStore};

use std::sync::Arc;
use studymate_core::tool::ToolRegistry;

/// Tool names owned by the task agent.
pub const TASK_TOOLS: [&str; 3] = ["create_task", "list_tasks", "complete_task"];

/// Tool names owned by the learning agent.
pub const PLAN_TOOLS: [&str; 2] = ["save_learning_plan", "list_learning_plans"];

/// Create the default tool registry over the given stores.
pub fn default_registry(
    tasks: Arc<dyn TaskStore>,
    plans: Arc<dyn PlanStore>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(task_tools::CreateTaskTool::new(tasks.clone())));
    registry.register(Box::new(task_tools::ListTasksTool::new(tasks.clone())));
    registry.register(Box::new(task_tools::CompleteTaskTool::new(tasks)));
    registry.register(Box::new(plan_tools::SaveLearningPlanTool::new(plans.clone())));
    registry.register(Box::new(plan_tools::ListLearningPlansTool::new(plans)));
    registry
}
