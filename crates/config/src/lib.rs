//! Configuration loading, validation, and management for StudyMate.
//!
//! Loads configuration from `~/.studymate/config.toml` with environment
//! variable overrides. Validates all settings at startup. A missing
//! config file means defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.studymate/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default response language ("en" or "es")
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Reasoning backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_language() -> String {
    "en".into()
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("default_language", &self.default_language)
            .field("backend", &self.backend)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Reasoning backend connection settings plus per-profile generation
/// settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (env vars take priority; see [`AppConfig::load`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-profile generation settings, keyed "fast" / "precise" /
    /// "creative". Missing profiles fall back to the fast profile.
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("profiles", &self.profiles)
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert("fast".into(), ProfileConfig::fast());
        profiles.insert("precise".into(), ProfileConfig::precise());
        profiles.insert("creative".into(), ProfileConfig::creative());
        Self {
            base_url: default_base_url(),
            api_key: None,
            profiles,
        }
    }
}

/// Generation settings for one backend profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Model identifier
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_timeout_secs() -> u64 {
    30
}

impl ProfileConfig {
    pub fn fast() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.5,
            max_tokens: 1024,
            timeout_secs: 20,
        }
    }

    pub fn precise() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: 0.2,
            max_tokens: 2048,
            timeout_secs: 45,
        }
    }

    pub fn creative() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: 0.9,
            max_tokens: 2048,
            timeout_secs: 45,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Soft bound on entry count; expired entries are swept on insert
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_ttl() -> u64 {
    1800
}
fn default_cache_capacity() -> usize {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.studymate/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `STUDYMATE_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.backend.api_key.is_none() {
            config.backend.api_key = std::env::var("STUDYMATE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(language) = std::env::var("STUDYMATE_LANGUAGE") {
            config.default_language = language;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, profile) in &self.backend.profiles {
            if !(0.0..=2.0).contains(&profile.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{name}': temperature must be between 0.0 and 2.0"
                )));
            }
            if profile.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "profile '{name}': timeout_secs must be > 0"
                )));
            }
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.backend.api_key.is_some()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".studymate")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            backend: BackendConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_language, "en");
        assert_eq!(config.backend.profiles.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_language, config.default_language);
        assert_eq!(parsed.cache.ttl_secs, config.cache.ttl_secs);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config
            .backend
            .profiles
            .insert("fast".into(), ProfileConfig {
                temperature: 5.0,
                ..ProfileConfig::fast()
            });
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ttl_rejected() {
        let config = AppConfig {
            cache: CacheConfig {
                ttl_secs: 0,
                ..CacheConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_language, "en");
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_language = \"es\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_language, "es");
        assert_eq!(config.cache.ttl_secs, default_cache_ttl());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            backend: BackendConfig {
                api_key: Some("sk-secret".into()),
                ..BackendConfig::default()
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
