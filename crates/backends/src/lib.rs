//! Reasoning backend adapters for StudyMate.
//!
//! `HttpBackend` speaks the OpenAI-compatible `/chat/completions`
//! protocol, which covers the vast majority of hosted and local
//! inference services. `BackendPool` holds one shared handle per
//! generation profile so each configuration is initialized exactly
//! once and reused across concurrent requests.

pub mod http;
pub mod pool;

pub use http::HttpBackend;
pub use pool::{BackendPool, build_from_config};
