//! End-to-end pipeline behavior: caching, routing precedence, context
//! propagation, and the degradation guarantees.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use studymate_agents::{Agent, AgentRegistry, TurnContext, default_agents};
use studymate_config::CacheConfig;
use studymate_core::context::{KEY_CALLER_ID, KEY_USER_NAME};
use studymate_core::error::BackendError;
use studymate_core::tool::ToolRegistry;
use studymate_core::{
    AgentId, AgentResponse, BackendReply, BackendRequest, MetricsSink, ReasoningBackend,
    RequestContext, RequestMetrics,
};
use studymate_orchestrator::{Orchestrator, RequestOptions, ResponseCache};
use studymate_router::RouterAgent;

/// Returns scripted replies in order, cycling the last one forever,
/// and counts invocations.
struct ScriptedBackend {
    replies: Vec<BackendReply>,
    calls: Mutex<usize>,
}

impl ScriptedBackend {
    fn new(replies: Vec<BackendReply>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            calls: Mutex::new(0),
        })
    }

    fn answering(text: &str) -> Arc<Self> {
        Self::new(vec![BackendReply::Answer(text.into())])
    }

    fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, _request: BackendRequest) -> Result<BackendReply, BackendError> {
        let mut calls = self.calls.lock().unwrap();
        let index = (*calls).min(self.replies.len() - 1);
        *calls += 1;
        Ok(self.replies[index].clone())
    }
}

/// A backend whose every call fails.
struct FailingBackend;

#[async_trait]
impl ReasoningBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn invoke(&self, _request: BackendRequest) -> Result<BackendReply, BackendError> {
        Err(BackendError::Network("connection refused".into()))
    }
}

/// Captures every metrics record.
#[derive(Default)]
struct CapturingSink {
    records: Mutex<Vec<RequestMetrics>>,
}

impl MetricsSink for CapturingSink {
    fn record(&self, metrics: RequestMetrics) {
        self.records.lock().unwrap().push(metrics);
    }
}

fn cache() -> ResponseCache {
    ResponseCache::new(&CacheConfig {
        ttl_secs: 600,
        capacity: 100,
    })
}

fn orchestrator_with(
    router_backend: Arc<dyn ReasoningBackend>,
    agent_backend: Arc<dyn ReasoningBackend>,
) -> Orchestrator {
    let agents = default_agents(|_profile| agent_backend.clone(), Arc::new(ToolRegistry::new()));
    Orchestrator::new(RouterAgent::new(router_backend), agents, cache())
}

#[tokio::test]
async fn second_identical_call_is_served_from_cache() {
    let agent_backend = ScriptedBackend::answering("Photosynthesis converts light to energy.");
    // The heuristic catches "what is", so the router backend is idle.
    let router_backend = ScriptedBackend::answering("unused");
    let engine = orchestrator_with(router_backend.clone(), agent_backend.clone());

    let first = engine
        .process_message("What is photosynthesis?", RequestOptions::new())
        .await;
    assert_eq!(first.routed_to, AgentId::General);
    assert!(!first.response.error);

    let before = agent_backend.call_count();
    let second = engine
        .process_message("What is photosynthesis?", RequestOptions::new())
        .await;

    // Bit-identical content, zero further backend invocations.
    assert_eq!(second.response.content, first.response.content);
    assert_eq!(agent_backend.call_count(), before);
    assert_eq!(router_backend.call_count(), 0);
    assert_eq!(second.routing.confidence, 1.0);
    assert_eq!(second.routing.reasoning, "cache hit");
}

#[tokio::test]
async fn cache_probe_ignores_entries_written_by_other_agents() {
    let agent_backend = ScriptedBackend::answering("On my list.");
    let router_backend = ScriptedBackend::answering("unused");
    let engine = orchestrator_with(router_backend, agent_backend.clone());

    engine
        .process_message("add a deadline for my essay", RequestOptions::new())
        .await;
    let before = agent_backend.call_count();

    // The probe is keyed to the General agent, so a Task-cached answer
    // does not short-circuit the repeat.
    engine
        .process_message("add a deadline for my essay", RequestOptions::new())
        .await;
    assert!(agent_backend.call_count() > before);
}

#[tokio::test]
async fn heuristic_keywords_bypass_the_router() {
    let agent_backend = ScriptedBackend::answering("Noted.");
    let router_backend = ScriptedBackend::answering("should never be consulted");
    let engine = orchestrator_with(router_backend.clone(), agent_backend);

    let outcome = engine
        .process_message("remind me about the deadline on Friday", RequestOptions::new())
        .await;

    assert_eq!(outcome.routed_to, AgentId::Task);
    assert!(outcome.routing.confidence >= 0.8);
    assert_eq!(outcome.routing.reasoning, "heuristic match");
    assert_eq!(router_backend.call_count(), 0);
}

#[tokio::test]
async fn unmatched_message_goes_through_the_router() {
    let agent_backend = ScriptedBackend::answering("Good morning!");
    let router_backend = ScriptedBackend::answering(
        r#"{"agent": "general", "confidence": 0.85, "reasoning": "greeting"}"#,
    );
    let engine = orchestrator_with(router_backend.clone(), agent_backend);

    let outcome = engine
        .process_message("buenos días", RequestOptions::new())
        .await;

    assert_eq!(router_backend.call_count(), 1);
    assert_eq!(outcome.routed_to, AgentId::General);
    assert_eq!(outcome.routing.reasoning, "greeting");
}

#[tokio::test]
async fn router_backend_failure_degrades_to_general() {
    let agent_backend = ScriptedBackend::answering("Here anyway.");
    let engine = orchestrator_with(Arc::new(FailingBackend), agent_backend);

    let outcome = engine
        .process_message("something unroutable", RequestOptions::new())
        .await;

    assert_eq!(outcome.routed_to, AgentId::General);
    assert!(outcome.routing.confidence <= 0.5);
    assert!(outcome.routing.reasoning.contains("routing error"));
    // The General agent still answers.
    assert!(!outcome.response.error);
    assert_eq!(outcome.response.content, "Here anyway.");
}

#[tokio::test]
async fn total_backend_failure_yields_localized_apology_not_panic() {
    let sink = Arc::new(CapturingSink::default());
    let failing: Arc<dyn ReasoningBackend> = Arc::new(FailingBackend);
    let agents = default_agents(|_| failing.clone(), Arc::new(ToolRegistry::new()));
    let engine = Orchestrator::new(RouterAgent::new(failing.clone()), agents, cache())
        .with_default_language("es")
        .with_metrics(sink.clone());

    let outcome = engine
        .process_message("ayúdame con algo", RequestOptions::new())
        .await;

    assert!(outcome.response.error);
    assert!(outcome.response.content.contains("Lo siento"));

    // Exactly one metrics entry, carrying the error.
    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].error.is_some());
    assert_eq!(records[0].language, "es");
}

#[tokio::test]
async fn tool_round_trip_flows_through_the_whole_pipeline() {
    use studymate_core::tool::ToolCall;
    use studymate_tools::{InMemoryStore, TaskStore, default_registry};

    let agent_backend = ScriptedBackend::new(vec![
        BackendReply::ToolCallsRequested {
            assistant_content: String::new(),
            calls: vec![ToolCall {
                id: "call_1".into(),
                name: "create_task".into(),
                arguments: json!({"title": "Submit essay", "due_date": "2026-09-05"}),
            }],
        },
        BackendReply::Answer("Saved it — essay due September 5.".into()),
    ]);
    let store = Arc::new(InMemoryStore::new());
    let tools = Arc::new(default_registry(store.clone(), store.clone()));
    let agents = default_agents(
        |_| agent_backend.clone() as Arc<dyn ReasoningBackend>,
        tools,
    );
    let engine = Orchestrator::new(
        RouterAgent::new(ScriptedBackend::answering("unused")),
        agents,
        cache(),
    );

    let mut context = RequestContext::new();
    context.insert(KEY_CALLER_ID, json!("caller-7"));
    let outcome = engine
        .process_message(
            "remind me to submit my essay",
            RequestOptions::new().with_context(context),
        )
        .await;

    assert_eq!(outcome.routed_to, AgentId::Task);
    assert!(!outcome.response.error);
    assert_eq!(agent_backend.call_count(), 2);

    let tasks = store.list("caller-7").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Submit essay");
}

#[tokio::test]
async fn error_responses_are_never_cached() {
    let failing: Arc<dyn ReasoningBackend> = Arc::new(FailingBackend);
    let failing_calls = Arc::new(Mutex::new(0usize));

    struct CountedFailingBackend(Arc<Mutex<usize>>);

    #[async_trait]
    impl ReasoningBackend for CountedFailingBackend {
        fn name(&self) -> &str {
            "counted-failing"
        }
        async fn invoke(&self, _request: BackendRequest) -> Result<BackendReply, BackendError> {
            *self.0.lock().unwrap() += 1;
            Err(BackendError::Network("down".into()))
        }
    }

    let counted: Arc<dyn ReasoningBackend> =
        Arc::new(CountedFailingBackend(failing_calls.clone()));
    let agents = default_agents(|_| counted.clone(), Arc::new(ToolRegistry::new()));
    let engine = Orchestrator::new(RouterAgent::new(failing), agents, cache());

    let degraded = engine
        .process_message("what is entropy?", RequestOptions::new())
        .await;
    assert!(degraded.response.error);
    let calls_after_first = *failing_calls.lock().unwrap();

    // The repeat hits the backend again: the degraded response must
    // not have been cached.
    let repeat = engine
        .process_message("what is entropy?", RequestOptions::new())
        .await;
    assert!(repeat.response.error);
    assert!(*failing_calls.lock().unwrap() > calls_after_first);
}

#[tokio::test]
async fn context_fields_reach_the_agent_unchanged() {
    /// Records the TurnContext it was handed.
    struct CapturingAgent {
        seen: Mutex<Option<TurnContext>>,
    }

    #[async_trait]
    impl Agent for CapturingAgent {
        fn id(&self) -> AgentId {
            AgentId::General
        }
        async fn process(&self, _message: &str, ctx: &TurnContext) -> AgentResponse {
            *self.seen.lock().unwrap() = Some(ctx.clone());
            AgentResponse::ok(AgentId::General, "seen")
        }
    }

    let capturing = Arc::new(CapturingAgent {
        seen: Mutex::new(None),
    });
    let mut agents = AgentRegistry::new();
    agents.register(capturing.clone());
    let engine = Orchestrator::new(
        RouterAgent::new(ScriptedBackend::answering("unused")),
        agents,
        cache(),
    );

    let mut context = RequestContext::new();
    context.insert(KEY_CALLER_ID, json!("caller-3"));
    context.insert(KEY_USER_NAME, json!("Leo"));
    let options = RequestOptions::new()
        .with_language("es")
        .with_context(context);

    engine.process_message("explain gravity", options).await;

    let seen = capturing.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.language, "es");
    assert_eq!(seen.context.caller_id(), Some("caller-3"));
    assert_eq!(seen.context.user_name(), Some("Leo"));
}

#[tokio::test]
async fn unregistered_agent_degrades_with_error_flag() {
    // Only General is registered; a Task-keyword message routes to the
    // missing Task agent.
    let mut agents = AgentRegistry::new();
    struct AnswerAgent;
    #[async_trait]
    impl Agent for AnswerAgent {
        fn id(&self) -> AgentId {
            AgentId::General
        }
        async fn process(&self, _m: &str, _c: &TurnContext) -> AgentResponse {
            AgentResponse::ok(AgentId::General, "hi")
        }
    }
    agents.register(Arc::new(AnswerAgent));
    let engine = Orchestrator::new(
        RouterAgent::new(ScriptedBackend::answering("unused")),
        agents,
        cache(),
    );

    let outcome = engine
        .process_message("remind me to call mom", RequestOptions::new())
        .await;

    assert_eq!(outcome.routed_to, AgentId::Task);
    assert!(outcome.response.error);
    assert!(!outcome.response.content.is_empty());
}

#[tokio::test]
async fn metrics_record_cache_hits_with_full_confidence() {
    let sink = Arc::new(CapturingSink::default());
    let agent_backend = ScriptedBackend::answering("Answer.");
    let agents = default_agents(
        |_| agent_backend.clone() as Arc<dyn ReasoningBackend>,
        Arc::new(ToolRegistry::new()),
    );
    let engine = Orchestrator::new(
        RouterAgent::new(ScriptedBackend::answering("unused")),
        agents,
        cache(),
    )
    .with_metrics(sink.clone());

    engine.process_message("what is osmosis?", RequestOptions::new()).await;
    engine.process_message("what is osmosis?", RequestOptions::new()).await;

    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].confidence, Some(0.9));
    assert!(records[0].error.is_none());
    assert_eq!(records[1].confidence, Some(1.0));
    assert_eq!(records[1].agent, AgentId::General);
}

#[tokio::test]
async fn router_confidence_is_clamped_into_unit_range() {
    let agent_backend = ScriptedBackend::answering("ok");
    let router_backend = ScriptedBackend::answering(
        r#"{"agent": "code", "confidence": 3.2, "reasoning": "overeager"}"#,
    );
    let engine = orchestrator_with(router_backend, agent_backend);

    let outcome = engine
        .process_message("something ambiguous", RequestOptions::new())
        .await;

    assert_eq!(outcome.routed_to, AgentId::Code);
    assert!(outcome.routing.confidence <= 1.0);
}
