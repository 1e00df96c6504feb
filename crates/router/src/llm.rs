//! LLM-backed router — the slow classification path.
//!
//! Builds a one-shot instruction prompt (always in English, regardless
//! of the user's language, for deterministic classification), invokes
//! the fast backend profile, and parses a `{agent, confidence,
//! reasoning}` JSON object out of the raw reply. Every failure —
//! backend error, empty reply, unparsable output — degrades to a
//! General decision with low confidence; `classify` never errors.

use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use studymate_core::{
    AgentId, BackendRequest, ChatMessage, ReasoningBackend, RequestContext, RoutingDecision,
};
use tracing::{debug, warn};

/// Confidence attached when the backend call itself failed.
const BACKEND_FAILURE_CONFIDENCE: f32 = 0.3;
/// Confidence attached when the reply could not be parsed.
const PARSE_FAILURE_CONFIDENCE: f32 = 0.4;

/// The LLM intent classifier.
pub struct RouterAgent {
    backend: Arc<dyn ReasoningBackend>,
}

/// The JSON shape the classifier is asked to produce.
#[derive(Debug, Deserialize)]
struct RawDecision {
    agent: String,
    confidence: f32,
    #[serde(default)]
    reasoning: String,
}

impl RouterAgent {
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self { backend }
    }

    /// Classify a message. Infallible: always yields a usable decision.
    pub async fn classify(&self, message: &str, context: &RequestContext) -> RoutingDecision {
        let prompt = Self::build_prompt(message, context);
        let request = BackendRequest::new(vec![ChatMessage::system(prompt)]);

        let reply = match self.backend.invoke(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Router backend call failed");
                return RoutingDecision::fallback(
                    format!("routing error: {e}"),
                    BACKEND_FAILURE_CONFIDENCE,
                );
            }
        };

        let Some(text) = reply.answer() else {
            warn!("Router backend requested tools; treating as unparsable");
            return RoutingDecision::fallback(
                "routing error: unexpected tool call",
                PARSE_FAILURE_CONFIDENCE,
            );
        };

        match Self::parse_decision(text) {
            Some(decision) => {
                debug!(agent = %decision.agent, confidence = decision.confidence, "Router classified message");
                decision
            }
            None => {
                warn!(reply = %text, "Router reply was empty or unparsable");
                RoutingDecision::fallback(
                    "routing error: unparsable classifier output",
                    PARSE_FAILURE_CONFIDENCE,
                )
            }
        }
    }

    /// One-shot classification prompt. Always English.
    fn build_prompt(message: &str, context: &RequestContext) -> String {
        let profile_hint = context
            .profile_summary()
            .map(|s| format!("\nUser profile: {s}"))
            .unwrap_or_default();

        format!(
            "You are an intent classifier for a study assistant. Classify the \
             user message into exactly one agent:\n\
             - learning: study plans, learning paths, what/how to learn\n\
             - task: tasks, reminders, deadlines, pending work\n\
             - code: programming help, debugging, errors in code\n\
             - roadmap: navigating the app, finding features or sections\n\
             - general: anything else (explanations, small talk)\n\n\
             Respond with ONLY a JSON object: \
             {{\"agent\": \"<name>\", \"confidence\": <0..1>, \"reasoning\": \"<short cause>\"}}\n\n\
             Example:\n\
             Message: \"make me a plan to learn statistics\"\n\
             {{\"agent\": \"learning\", \"confidence\": 0.95, \"reasoning\": \"asks for a learning plan\"}}\n\
             {profile_hint}\n\
             Message: \"{message}\""
        )
    }

    /// Parse a decision out of raw reply text, tolerating surrounding
    /// prose around the JSON object.
    fn parse_decision(text: &str) -> Option<RoutingDecision> {
        let json = extract_json_object(text)?;
        let raw: RawDecision = serde_json::from_str(json).ok()?;
        let agent = AgentId::from_str(&raw.agent).ok()?;
        Some(RoutingDecision::new(agent, raw.confidence, raw.reasoning))
    }
}

/// Extract the first balanced `{...}` substring from text.
///
/// Brace counting ignores braces inside JSON string literals so that
/// reasoning text containing `{` cannot break extraction.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use studymate_core::BackendReply;
    use studymate_core::error::BackendError;

    /// A backend that returns a fixed reply (or error) and counts calls.
    struct ScriptedBackend {
        reply: Result<String, BackendError>,
        calls: Mutex<usize>,
    }

    impl ScriptedBackend {
        fn answering(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(BackendError::Network("connection refused".into())),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn invoke(&self, _request: BackendRequest) -> Result<BackendReply, BackendError> {
            *self.calls.lock().unwrap() += 1;
            self.reply.clone().map(BackendReply::Answer)
        }
    }

    #[tokio::test]
    async fn parses_clean_json_reply() {
        let backend = Arc::new(ScriptedBackend::answering(
            r#"{"agent": "task", "confidence": 0.92, "reasoning": "asks about deadlines"}"#,
        ));
        let router = RouterAgent::new(backend);
        let d = router.classify("when is it due?", &RequestContext::new()).await;
        assert_eq!(d.agent, AgentId::Task);
        assert!((d.confidence - 0.92).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn tolerates_surrounding_prose() {
        let backend = Arc::new(ScriptedBackend::answering(
            "Sure! Here is the classification:\n{\"agent\": \"code\", \"confidence\": 0.8, \"reasoning\": \"code question\"}\nHope that helps.",
        ));
        let router = RouterAgent::new(backend);
        let d = router.classify("why NPE?", &RequestContext::new()).await;
        assert_eq!(d.agent, AgentId::Code);
    }

    #[tokio::test]
    async fn backend_error_degrades_to_general() {
        let router = RouterAgent::new(Arc::new(ScriptedBackend::failing()));
        let d = router.classify("anything", &RequestContext::new()).await;
        assert_eq!(d.agent, AgentId::General);
        assert!(d.confidence >= 0.3 && d.confidence <= 0.5);
        assert!(d.reasoning.contains("routing error"));
    }

    #[tokio::test]
    async fn unparsable_reply_degrades_to_general() {
        let router = RouterAgent::new(Arc::new(ScriptedBackend::answering("no json here")));
        let d = router.classify("anything", &RequestContext::new()).await;
        assert_eq!(d.agent, AgentId::General);
        assert!(d.confidence >= 0.3 && d.confidence <= 0.5);
    }

    #[tokio::test]
    async fn unknown_agent_name_degrades() {
        let backend = Arc::new(ScriptedBackend::answering(
            r#"{"agent": "planner", "confidence": 0.9, "reasoning": "?"}"#,
        ));
        let router = RouterAgent::new(backend);
        let d = router.classify("anything", &RequestContext::new()).await;
        assert_eq!(d.agent, AgentId::General);
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let backend = Arc::new(ScriptedBackend::answering(
            r#"{"agent": "learning", "confidence": 1.8, "reasoning": "very sure"}"#,
        ));
        let router = RouterAgent::new(backend);
        let d = router.classify("plan please", &RequestContext::new()).await;
        assert_eq!(d.confidence, 1.0);
    }

    #[test]
    fn extract_handles_braces_in_strings() {
        let text = r#"{"agent": "general", "confidence": 0.5, "reasoning": "contains { brace"}"#;
        let extracted = extract_json_object(text).unwrap();
        assert_eq!(extracted, text);
    }

    #[test]
    fn extract_returns_first_balanced_object() {
        let text = "prefix {\"a\": {\"b\": 1}} suffix {\"c\": 2}";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn extract_unbalanced_returns_none() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no braces"), None);
    }
}
