//! Backend pool — one shared handle per generation profile.
//!
//! Built once at startup from configuration; every request borrows the
//! pooled `Arc` for its profile instead of constructing a new client.

use crate::http::HttpBackend;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use studymate_config::{AppConfig, ProfileConfig};
use studymate_core::{Profile, ReasoningBackend};

/// Shared reasoning-backend handles, keyed by profile.
pub struct BackendPool {
    backends: HashMap<Profile, Arc<dyn ReasoningBackend>>,
}

impl BackendPool {
    /// An empty pool; register handles manually (tests, custom wiring).
    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Register a backend for a profile, replacing any previous handle.
    pub fn register(&mut self, profile: Profile, backend: Arc<dyn ReasoningBackend>) {
        self.backends.insert(profile, backend);
    }

    /// Get the pooled handle for a profile.
    ///
    /// Profiles without a registered handle fall back to Fast, so a
    /// fully-registered Fast slot guarantees every profile resolves.
    pub fn get(&self, profile: Profile) -> Option<Arc<dyn ReasoningBackend>> {
        self.backends
            .get(&profile)
            .or_else(|| self.backends.get(&Profile::Fast))
            .cloned()
    }

    /// Number of registered profile slots.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Whether any registered backend answers a health check.
    pub async fn health_check(&self) -> bool {
        for backend in self.backends.values() {
            if let Ok(true) = backend.health_check().await {
                return true;
            }
        }
        false
    }
}

/// Build the pool from configuration: one `HttpBackend` per profile.
///
/// Profiles missing from the config borrow the fast profile's settings.
pub fn build_from_config(config: &AppConfig) -> BackendPool {
    let api_key = config.backend.api_key.clone().unwrap_or_default();
    let fast_settings = config
        .backend
        .profiles
        .get("fast")
        .cloned()
        .unwrap_or_else(ProfileConfig::fast);

    let mut pool = BackendPool::empty();
    for profile in Profile::ALL {
        let settings = config
            .backend
            .profiles
            .get(profile.as_str())
            .cloned()
            .unwrap_or_else(|| fast_settings.clone());

        let backend = HttpBackend::new(
            profile.as_str(),
            &config.backend.base_url,
            &api_key,
            &settings.model,
            settings.temperature,
            settings.max_tokens,
            Duration::from_secs(settings.timeout_secs),
        );
        pool.register(profile, Arc::new(backend));
    }

    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use studymate_core::error::BackendError;
    use studymate_core::{BackendReply, BackendRequest};

    struct StubBackend(&'static str);

    #[async_trait]
    impl ReasoningBackend for StubBackend {
        fn name(&self) -> &str {
            self.0
        }
        async fn invoke(&self, _request: BackendRequest) -> Result<BackendReply, BackendError> {
            Ok(BackendReply::Answer("stub".into()))
        }
    }

    #[test]
    fn build_from_default_config_covers_all_profiles() {
        let pool = build_from_config(&AppConfig::default());
        assert_eq!(pool.len(), 3);
        for profile in Profile::ALL {
            assert!(pool.get(profile).is_some());
        }
    }

    #[test]
    fn missing_profile_falls_back_to_fast() {
        let mut pool = BackendPool::empty();
        pool.register(Profile::Fast, Arc::new(StubBackend("fast")));

        let resolved = pool.get(Profile::Creative).unwrap();
        assert_eq!(resolved.name(), "fast");
    }

    #[test]
    fn empty_pool_resolves_nothing() {
        let pool = BackendPool::empty();
        assert!(pool.get(Profile::Fast).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn register_replaces_handle() {
        let mut pool = BackendPool::empty();
        pool.register(Profile::Fast, Arc::new(StubBackend("a")));
        pool.register(Profile::Fast, Arc::new(StubBackend("b")));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(Profile::Fast).unwrap().name(), "b");
    }
}
