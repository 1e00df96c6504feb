//! The task agent: creates, lists, and completes tasks with deadlines.

use crate::base::{Agent, TurnContext, run_turn};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use studymate_core::tool::ToolRegistry;
use studymate_core::{AgentId, AgentResponse, ReasoningBackend};
use studymate_tools::TASK_TOOLS;

const INSTRUCTION: &str = "You are StudyMate's task assistant. You help the user capture \
tasks and deadlines, review what is pending, and mark things done. Use create_task when the \
user mentions something they need to do, list_tasks when they ask what is pending, and \
complete_task when they say something is finished. When the user gives a relative date \
(\"next Friday\", \"in two weeks\"), resolve it to an absolute YYYY-MM-DD date before \
calling a tool.";

pub struct TaskAgent {
    backend: Arc<dyn ReasoningBackend>,
    tools: Arc<ToolRegistry>,
}

impl TaskAgent {
    pub fn new(backend: Arc<dyn ReasoningBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self { backend, tools }
    }
}

#[async_trait]
impl Agent for TaskAgent {
    fn id(&self) -> AgentId {
        AgentId::Task
    }

    async fn process(&self, message: &str, ctx: &TurnContext) -> AgentResponse {
        // Relative dates in the message only resolve correctly if the
        // backend knows today's date.
        let instruction = format!(
            "{INSTRUCTION}\n\nToday's date is {}.",
            Utc::now().format("%Y-%m-%d")
        );
        run_turn(
            self.id(),
            &instruction,
            &TASK_TOOLS,
            &self.backend,
            &self.tools,
            message,
            ctx,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use studymate_core::error::BackendError;
    use studymate_core::tool::ToolCall;
    use studymate_core::{BackendReply, BackendRequest, RequestContext, Role};
    use studymate_tools::{InMemoryStore, TaskStore, default_registry};

    struct ScriptedBackend {
        replies: Mutex<Vec<Result<BackendReply, BackendError>>>,
        requests: Mutex<Vec<BackendRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<BackendReply, BackendError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }
        async fn invoke(&self, request: BackendRequest) -> Result<BackendReply, BackendError> {
            self.requests.lock().unwrap().push(request);
            self.replies.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn create_task_round_trip_persists_for_caller() {
        let scripted = Arc::new(ScriptedBackend::new(vec![
            Ok(BackendReply::ToolCallsRequested {
                assistant_content: String::new(),
                calls: vec![ToolCall {
                    id: "call_1".into(),
                    name: "create_task".into(),
                    arguments: json!({"title": "Hand in essay", "due_date": "2026-09-04"}),
                }],
            }),
            Ok(BackendReply::Answer(
                "Saved: hand in essay by September 4.".into(),
            )),
        ]));
        let store = Arc::new(InMemoryStore::new());
        let registry = Arc::new(default_registry(store.clone(), store.clone()));
        let agent = TaskAgent::new(scripted.clone(), registry);

        let mut context = RequestContext::new();
        context.insert(studymate_core::context::KEY_CALLER_ID, json!("caller-9"));
        let ctx = TurnContext::new(vec![], "en", context);

        let resp = agent.process("remind me to hand in my essay next Friday", &ctx).await;

        assert!(!resp.error);
        assert_eq!(resp.content, "Saved: hand in essay by September 4.");
        assert_eq!(resp.metadata["toolsUsed"], json!(["create_task"]));

        // The tool wrote under the context caller id, not an argument.
        let tasks = store.list("caller-9").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Hand in essay");
    }

    #[tokio::test]
    async fn instruction_carries_todays_date() {
        let scripted = Arc::new(ScriptedBackend::new(vec![Ok(BackendReply::Answer(
            "Nothing due.".into(),
        ))]));
        let store = Arc::new(InMemoryStore::new());
        let registry = Arc::new(default_registry(store.clone(), store));
        let agent = TaskAgent::new(scripted.clone(), registry);

        agent
            .process("what's due?", &TurnContext::new(vec![], "en", RequestContext::new()))
            .await;

        let requests = scripted.requests.lock().unwrap();
        let system = &requests[0].messages[0];
        assert_eq!(system.role, Role::System);
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert!(system.content.contains(&today));
    }
}
