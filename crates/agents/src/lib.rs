//! The agent contract and the five specialized StudyMate agents.
//!
//! Every agent implements the same `process(message, ctx) ->
//! AgentResponse` contract and is selectable by `AgentId` through the
//! [`AgentRegistry`]. Agents never propagate errors — every failure
//! degrades to a localized apology with `error: true`.

pub mod base;
pub mod code;
pub mod general;
pub mod instruction;
pub mod learning;
pub mod registry;
pub mod roadmap;
pub mod task;

pub use base::{Agent, TurnContext};
pub use code::CodeAgent;
pub use general::GeneralAgent;
pub use instruction::build_instruction;
pub use learning::LearningAgent;
pub use registry::{AgentRegistry, default_agents};
pub use roadmap::RoadmapAgent;
pub use task::TaskAgent;
