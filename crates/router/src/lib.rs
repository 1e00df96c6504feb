//! Intent classification for StudyMate.
//!
//! Two stages: a zero-latency keyword heuristic that short-circuits
//! the common intents, and an LLM-backed router for everything else.
//! Classification never fails — every path yields a usable
//! [`studymate_core::RoutingDecision`].

pub mod heuristic;
pub mod llm;

pub use heuristic::fast_route;
pub use llm::RouterAgent;
