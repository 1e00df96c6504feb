//! The StudyMate request pipeline.
//!
//! [`Orchestrator::process_message`] is the single public entry point:
//! cache probe, two-node route/process pipeline, cache write, metrics.
//! It never returns an error; every failure mode degrades into a
//! well-formed [`studymate_core::AgentResponse`] with `error: true`.

pub mod cache;
pub mod metrics;
pub mod orchestrator;
pub mod state;

pub use cache::ResponseCache;
pub use metrics::TracingMetricsSink;
pub use orchestrator::{Orchestrator, ProcessOutcome, RequestOptions};
pub use state::{PipelineState, StatePatch};
