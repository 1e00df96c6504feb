//! The normalized agent response returned to the caller.
//!
//! `content` is always a string — the pipeline boundary enforces this,
//! and failures only ever manifest as `error: true` plus an apologetic
//! message, never as a raised exception.

use crate::routing::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized response from an agent (or from the orchestrator's
/// own degradation paths).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Which agent produced this response.
    pub agent: AgentId,

    /// The response text. Always a string, never null.
    pub content: String,

    /// When the response was produced (RFC 3339).
    pub timestamp: DateTime<Utc>,

    /// Whether this is a degraded/error response.
    #[serde(default)]
    pub error: bool,

    /// Agent-specific metadata (tool names used, plan ids, etc.).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl AgentResponse {
    /// A successful response.
    pub fn ok(agent: AgentId, content: impl Into<String>) -> Self {
        Self {
            agent,
            content: content.into(),
            timestamp: Utc::now(),
            error: false,
            metadata: serde_json::Map::new(),
        }
    }

    /// A degraded response carrying the localized apology.
    pub fn degraded(agent: AgentId, language: &str) -> Self {
        Self {
            agent,
            content: apology(language).to_string(),
            timestamp: Utc::now(),
            error: true,
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// The short localized apology used on every degradation path.
///
/// Unknown language codes fall back to English.
pub fn apology(language: &str) -> &'static str {
    match language {
        "es" => "Lo siento, tuve un problema procesando tu mensaje. Por favor, inténtalo de nuevo.",
        _ => "Sorry, I ran into a problem handling your message. Please try again.",
    }
}
