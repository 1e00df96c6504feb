//! # StudyMate Core
//!
//! Domain types, traits, and error definitions for the StudyMate
//! multi-agent routing engine. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod context;
pub mod error;
pub mod message;
pub mod metrics;
pub mod response;
pub mod routing;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use backend::{BackendReply, BackendRequest, Profile, ReasoningBackend, ToolSpec};
pub use context::RequestContext;
pub use error::{BackendError, ToolError};
pub use message::{ChatMessage, Role};
pub use metrics::{MetricsSink, RequestMetrics};
pub use response::AgentResponse;
pub use routing::{AgentId, RoutingDecision};
pub use tool::{InvocationMetadata, Tool, ToolCall, ToolRegistry, ToolResult};
