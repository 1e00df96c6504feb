//! The request engine: cache probe, route, process, cache write,
//! metrics.

use crate::cache::ResponseCache;
use crate::metrics::TracingMetricsSink;
use crate::state::{PipelineState, StatePatch};
use std::sync::Arc;
use std::time::Instant;
use studymate_agents::{AgentRegistry, TurnContext};
use studymate_core::{
    AgentId, AgentResponse, ChatMessage, MetricsSink, RequestContext, RequestMetrics,
    RoutingDecision,
};
use studymate_router::{RouterAgent, fast_route};
use tracing::{debug, info, warn};

/// Per-request options accompanying the message.
///
/// Everything the caller supplies beyond history and language travels
/// in `context` — caller identity, display name, profile summary, and
/// any opaque keys the identity collaborator adds.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub history: Vec<ChatMessage>,
    pub language: Option<String>,
    pub context: RequestContext,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// What `process_message` hands back: the response plus how the
/// request was routed.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub response: AgentResponse,
    pub routed_to: AgentId,
    pub routing: RoutingDecision,
}

/// The orchestration engine. One instance per application; shared
/// across concurrent requests.
pub struct Orchestrator {
    router: RouterAgent,
    agents: AgentRegistry,
    cache: ResponseCache,
    metrics: Arc<dyn MetricsSink>,
    default_language: String,
}

impl Orchestrator {
    pub fn new(router: RouterAgent, agents: AgentRegistry, cache: ResponseCache) -> Self {
        Self {
            router,
            agents,
            cache,
            metrics: Arc::new(TracingMetricsSink),
            default_language: "en".into(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Handle one user message end to end.
    ///
    /// Infallible: every failure mode inside routing, agent execution,
    /// and tool calls degrades to an `error: true` response. The caller
    /// never sees an `Err`.
    pub async fn process_message(&self, message: &str, options: RequestOptions) -> ProcessOutcome {
        let started = Instant::now();
        let language = options
            .language
            .clone()
            .unwrap_or_else(|| self.default_language.clone());

        // Cache probe before any routing work. The probe key uses the
        // General agent id; writes below use the agent that actually
        // answered, so only General-routed answers are ever probed out.
        if let Some(cached) = self.cache.get(message, AgentId::General, &language).await {
            debug!(agent = %cached.agent, "Cache hit");
            let routed_to = cached.agent;
            self.record(routed_to, &language, started, Some(1.0), None);
            return ProcessOutcome {
                response: cached,
                routed_to,
                routing: RoutingDecision::new(routed_to, 1.0, "cache hit"),
            };
        }

        let mut state = PipelineState {
            messages: options.history,
            language: language.clone(),
            context: options.context,
            ..Default::default()
        };

        // Route node.
        let decision = self.route(message, &state.context).await;
        info!(
            agent = %decision.agent,
            confidence = decision.confidence,
            reasoning = %decision.reasoning,
            "Routed message"
        );
        state.apply(StatePatch::routed(decision));

        // Process node.
        let response = self.process(message, &state).await;
        state.apply(StatePatch::responded(response));

        // The two patches above guarantee both fields are set.
        let routing = state
            .routing
            .unwrap_or_else(|| RoutingDecision::fallback("missing routing state", 0.0));
        let response = state
            .response
            .unwrap_or_else(|| AgentResponse::degraded(routing.agent, &language));

        if !response.error {
            self.cache
                .insert(message, response.agent, &language, response.clone())
                .await;
        }

        let error = response.error.then(|| "degraded response".to_string());
        self.record(
            response.agent,
            &language,
            started,
            Some(routing.confidence),
            error,
        );

        ProcessOutcome {
            routed_to: routing.agent,
            routing,
            response,
        }
    }

    /// The route node: heuristic fast path first, LLM router on a miss.
    async fn route(&self, message: &str, context: &RequestContext) -> RoutingDecision {
        if let Some(agent) = fast_route(message) {
            return RoutingDecision::heuristic(agent);
        }
        self.router.classify(message, context).await
    }

    /// The process node: dispatch to the routed agent, degrading on a
    /// registry miss.
    async fn process(&self, message: &str, state: &PipelineState) -> AgentResponse {
        let agent_id = state.current_agent.unwrap_or(AgentId::General);
        let Some(agent) = self.agents.get(agent_id) else {
            warn!(agent = %agent_id, "Routed to an unregistered agent");
            return AgentResponse::degraded(agent_id, &state.language);
        };

        let ctx = TurnContext::new(
            state.messages.clone(),
            state.language.clone(),
            state.context.clone(),
        );
        agent.process(message, &ctx).await
    }

    fn record(
        &self,
        agent: AgentId,
        language: &str,
        started: Instant,
        confidence: Option<f32>,
        error: Option<String>,
    ) {
        self.metrics.record(RequestMetrics {
            agent,
            language: language.to_string(),
            response_time_ms: started.elapsed().as_millis() as u64,
            confidence,
            error,
        });
    }
}
