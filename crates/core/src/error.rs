//! Error types for the StudyMate domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded
//! context has its own error enum; there is deliberately no umbrella
//! type, because the outer boundaries are infallible by contract —
//! router classification, agent processing, and the orchestrator entry
//! point all degrade instead of raising — so these types only travel
//! *inside* those boundaries.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Store error: {0}")]
    Store(String),
}
