//! ReasoningBackend trait — the abstraction over the text-generation
//! service.
//!
//! A backend knows how to send a message sequence to the reasoning
//! service and get a reply back. When tool specs are bound to the
//! request, the reply is a tagged variant: either a final answer or an
//! explicit request to execute tools — the two-phase protocol is a
//! visible branch, not a "check if tool_calls is non-empty" pattern.

use crate::error::BackendError;
use crate::message::ChatMessage;
use crate::tool::ToolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A generation profile. Backends are pooled per profile so that each
/// configuration is initialized once and shared across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Low latency, cheap — routing and short answers.
    Fast,
    /// Deterministic, higher quality — code help.
    Precise,
    /// Higher temperature — plan generation.
    Creative,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Fast, Profile::Precise, Profile::Creative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Fast => "fast",
            Profile::Precise => "precise",
            Profile::Creative => "creative",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool specification sent to the backend so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// The tool name
    pub name: String,

    /// Description of what the tool does (the backend uses this to
    /// decide when to invoke it)
    pub description: String,

    /// JSON Schema describing the tool's arguments
    pub parameters: serde_json::Value,
}

/// A request to the reasoning backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRequest {
    /// The ordered message sequence: system instruction, history,
    /// current user message (and, on the second phase, the tool-call
    /// assistant message plus tool results).
    pub messages: Vec<ChatMessage>,

    /// Tool specs bound to this call. Empty means plain completion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

impl BackendRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

/// The reply from a reasoning backend — either a final answer or a
/// request to execute tools before answering.
#[derive(Debug, Clone)]
pub enum BackendReply {
    /// Plain text content; the turn is complete.
    Answer(String),

    /// The backend wants tools executed. The caller must fold the
    /// assistant message (content + calls) and one tool result per
    /// call id back into the sequence, then invoke the backend again.
    ToolCallsRequested {
        /// Any content accompanying the tool calls (often empty).
        assistant_content: String,
        /// The requested calls, in order.
        calls: Vec<ToolCall>,
    },
}

impl BackendReply {
    /// The answer content, if this reply is final.
    pub fn answer(&self) -> Option<&str> {
        match self {
            BackendReply::Answer(text) => Some(text),
            BackendReply::ToolCallsRequested { .. } => None,
        }
    }
}

/// The core backend trait.
///
/// Implementations must enforce their own request timeout and surface
/// it as an ordinary [`BackendError`] — the agents' catch-and-degrade
/// logic handles the rest. Must tolerate being invoked twice per
/// tool-using turn (propose-tools, then finalize-with-results).
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Send a message sequence and get a reply.
    async fn invoke(&self, request: BackendRequest) -> Result<BackendReply, BackendError>;

    /// Health check — can we reach the service?
    async fn health_check(&self) -> Result<bool, BackendError> {
        Ok(true)
    }
}
