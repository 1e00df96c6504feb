//! Per-request metrics recording.
//!
//! The sink is fire-and-forget: `record` must never block the response
//! path. The engine records one entry per request, including the
//! degraded paths.

use crate::routing::AgentId;
use serde::{Deserialize, Serialize};

/// One request's worth of observability data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// The agent that handled (or was supposed to handle) the request.
    pub agent: AgentId,

    /// The request language.
    pub language: String,

    /// Wall-clock time from entry to response.
    pub response_time_ms: u64,

    /// Routing confidence, when a decision was made. Cache hits record 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Error description for degraded requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An external metrics sink.
///
/// Implementations use interior synchronization; `record` takes `&self`
/// and must return promptly.
pub trait MetricsSink: Send + Sync {
    fn record(&self, metrics: RequestMetrics);
}

/// A sink that drops everything. Useful as a default and in tests.
#[derive(Debug, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _metrics: RequestMetrics) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_serialization_omits_empty_fields() {
        let m = RequestMetrics {
            agent: AgentId::General,
            language: "en".into(),
            response_time_ms: 12,
            confidence: None,
            error: None,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("confidence"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn noop_sink_accepts_records() {
        let sink = NoopMetricsSink;
        sink.record(RequestMetrics {
            agent: AgentId::Task,
            language: "es".into(),
            response_time_ms: 1,
            confidence: Some(0.9),
            error: None,
        });
    }
}
