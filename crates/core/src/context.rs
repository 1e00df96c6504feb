//! Per-request context — the key/value bag threaded through the pipeline.
//!
//! Carries caller-derived data (identity, display name, profile summary)
//! from the entry point into routing and agent execution. The merge law
//! is right-biased and key-preserving: merging never drops a key that
//! either operand held.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known context keys supplied by the identity collaborator.
pub const KEY_CALLER_ID: &str = "callerId";
pub const KEY_USER_NAME: &str = "userName";
pub const KEY_PROFILE_SUMMARY: &str = "profileSummary";

/// A typed, extensible key/value store for per-request context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestContext(Map<String, Value>);

impl RequestContext {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a context from an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Insert a key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The caller identity, if the session collaborator supplied one.
    pub fn caller_id(&self) -> Option<&str> {
        self.get_str(KEY_CALLER_ID)
    }

    /// The caller's display name, if known.
    pub fn user_name(&self) -> Option<&str> {
        self.get_str(KEY_USER_NAME)
    }

    /// A precomputed textual profile summary, if known.
    pub fn profile_summary(&self) -> Option<&str> {
        self.get_str(KEY_PROFILE_SUMMARY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merge another context into this one.
    ///
    /// Right-biased: `other`'s value wins on key collision. Every key
    /// present in either operand survives the merge.
    pub fn merge(&mut self, other: &RequestContext) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for RequestContext {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
