//! The default metrics sink: one structured log line per request.
//!
//! Recording is synchronous and cheap (a `tracing` event), so it never
//! blocks the response path. Deployments with a real metrics backend
//! swap in their own [`MetricsSink`].

use studymate_core::{MetricsSink, RequestMetrics};
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record(&self, metrics: RequestMetrics) {
        match &metrics.error {
            Some(error) => info!(
                agent = %metrics.agent,
                language = %metrics.language,
                response_time_ms = metrics.response_time_ms,
                confidence = metrics.confidence.map(f64::from),
                error = %error,
                "Request completed with error"
            ),
            None => info!(
                agent = %metrics.agent,
                language = %metrics.language,
                response_time_ms = metrics.response_time_ms,
                confidence = metrics.confidence.map(f64::from),
                "Request completed"
            ),
        }
    }
}
