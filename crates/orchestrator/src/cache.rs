//! Content-addressable response cache with a fixed TTL.
//!
//! Keys are the SHA-256 of `normalized_message|agent|language`, where
//! normalization trims, lowercases, and collapses internal whitespace,
//! so "What is DNA?" and "  what  is dna? " share an entry. Entries
//! are owned exclusively by the cache; concurrent get/set is safe and
//! last-writer-wins on a key, which is acceptable because entries are
//! idempotent recomputations.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use studymate_core::{AgentId, AgentResponse};
use studymate_config::CacheConfig;
use tokio::sync::RwLock;
use tracing::debug;

struct CacheEntry {
    response: AgentResponse,
    inserted_at: Instant,
}

pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(config.ttl_secs),
            capacity: config.capacity,
        }
    }

    /// Derive the cache key for a (message, agent, language) triple.
    pub fn key(message: &str, agent: AgentId, language: &str) -> String {
        let normalized = normalize(message);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hasher.update(b"|");
        hasher.update(agent.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(language.as_bytes());
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            use std::fmt::Write;
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }

    /// Look up a live entry. Expired entries are treated as misses
    /// (and left for the next insert sweep to collect).
    pub async fn get(&self, message: &str, agent: AgentId, language: &str) -> Option<AgentResponse> {
        let key = Self::key(message, agent, language);
        let entries = self.entries.read().await;
        let entry = entries.get(&key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.response.clone())
    }

    /// Insert a response. When at capacity, expired entries are swept
    /// first; if the cache is still full, the oldest entry is dropped.
    pub async fn insert(&self, message: &str, agent: AgentId, language: &str, response: AgentResponse) {
        let key = Self::key(message, agent, language);
        let mut entries = self.entries.write().await;

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let before = entries.len();
            entries.retain(|_, e| e.inserted_at.elapsed() < self.ttl);
            debug!(swept = before - entries.len(), "Swept expired cache entries");

            if entries.len() >= self.capacity {
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                response,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Trim, lowercase, collapse runs of whitespace to single spaces.
fn normalize(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
